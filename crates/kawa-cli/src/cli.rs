//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use kawa_core::InstallConfig;
use kawa_core::TransportConfig;
use kawa_core::config::DEFAULT_PORT;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kawa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (per-file digests in `info`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Base URL of the module server
    #[arg(long, global = true, value_name = "URL", default_value_t = TransportConfig::default().base_url)]
    pub server: String,

    /// Request timeout in milliseconds
    #[arg(
        long,
        global = true,
        value_name = "MS",
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_ms: u64,

    /// Directory modules are installed into
    #[arg(long, global = true, value_name = "DIR", default_value = "app/modules")]
    pub install_dir: PathBuf,
}

impl Cli {
    /// Transport settings from the global flags.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            base_url: self.server.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    /// Install layout from the global flags.
    pub fn install_config(&self) -> InstallConfig {
        InstallConfig {
            install_dir: self.install_dir.clone(),
            ..Default::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the manifest store for a module root
    Build(BuildArgs),
    /// Serve a module root over HTTP
    Serve(ServeArgs),
    /// List published modules
    List,
    /// Show a module's metadata
    Info(InfoArgs),
    /// Download and install a module
    Install(InstallArgs),
    /// Remove an installed module
    Remove(RemoveArgs),
}

#[derive(clap::Args)]
pub struct BuildArgs {
    /// Directory scanned for module archives
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Directory to serve
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Address to listen on
    #[arg(long, value_name = "ADDR", default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    pub addr: SocketAddr,
}

#[derive(clap::Args)]
pub struct InfoArgs {
    /// Module name
    #[arg(value_name = "NAME")]
    pub name: String,
}

#[derive(clap::Args)]
pub struct InstallArgs {
    /// Module name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Check file digests against the published manifest before extracting
    #[arg(long)]
    pub verify: bool,

    /// Directory the archive is downloaded to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub download_dir: PathBuf,
}

#[derive(clap::Args)]
pub struct RemoveArgs {
    /// Module name
    #[arg(value_name = "NAME")]
    pub name: String,
}
