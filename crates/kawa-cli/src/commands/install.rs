//! Install command implementation

use crate::cli::Cli;
use crate::cli::InstallArgs;
use crate::error::convert_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use kawa_core::InstallConfig;
use kawa_core::client::HttpTransport;
use kawa_core::client::install;

pub fn execute(cli: &Cli, args: &InstallArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = InstallConfig {
        download_dir: args.download_dir.clone(),
        verify_digests: args.verify,
        ..cli.install_config()
    };

    let transport = HttpTransport::new(cli.transport_config());
    let report =
        install(&transport, &args.name, &config).map_err(|e| convert_error(e, &args.name))?;

    formatter.format_install_result(&report, &config.install_dir)
}
