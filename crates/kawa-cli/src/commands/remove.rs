//! Remove command implementation

use crate::cli::Cli;
use crate::cli::RemoveArgs;
use crate::error::convert_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use kawa_core::client::remove;

pub fn execute(cli: &Cli, args: &RemoveArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let outcome =
        remove(&args.name, &cli.install_config()).map_err(|e| convert_error(e, &args.name))?;

    formatter.format_remove_result(&args.name, &outcome)
}
