//! Info command implementation

use crate::cli::Cli;
use crate::cli::InfoArgs;
use crate::error::convert_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use kawa_core::client::HttpTransport;
use kawa_core::client::ModuleSource;
use kawa_core::types::ModuleName;

pub fn execute(cli: &Cli, args: &InfoArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let name = ModuleName::parse(&args.name).map_err(|e| convert_error(e, &args.name))?;

    let transport = HttpTransport::new(cli.transport_config());
    let detail = transport
        .fetch_detail(&name)
        .map_err(|e| convert_error(e, &args.name))?;

    formatter.format_module_detail(&detail)
}
