//! List command implementation

use crate::cli::Cli;
use crate::error::convert_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use kawa_core::client::HttpTransport;
use kawa_core::client::ModuleSource;

pub fn execute(cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let transport = HttpTransport::new(cli.transport_config());
    let index = transport
        .fetch_index()
        .map_err(|e| convert_error(e, &cli.server))?;

    formatter.format_module_list(&index)
}
