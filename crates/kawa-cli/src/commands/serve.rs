//! Serve command implementation

use crate::cli::ServeArgs;
use crate::error::convert_error;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use kawa_core::ServeConfig;
use kawa_core::server::serve_listener;
use std::net::TcpListener;

pub fn execute(args: &ServeArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = ServeConfig {
        root: args.root.clone(),
        addr: args.addr,
    };

    // Bound here so port 0 is announced as the real port.
    let listener = TcpListener::bind(config.addr)
        .with_context(|| format!("Cannot listen on {}", config.addr))?;
    formatter.format_serving(listener.local_addr()?, &config.root)?;

    serve_listener(listener, &config.root)
        .map_err(|e| convert_error(e, &config.root.display().to_string()))
}
