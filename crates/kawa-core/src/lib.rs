//! Module manifest building, serving and safe installation.
//!
//! `kawa-core` turns a directory of module archives into a manifest store
//! (an index plus one detail document per module with SHA-256 digests of
//! every file), serves it over HTTP, and installs modules on the client
//! side with path containment enforced for every archive entry.
//!
//! # Examples
//!
//! ```no_run
//! use kawa_core::BuildConfig;
//! use kawa_core::build_manifest;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfig {
//!     root: "modules".into(),
//!     ..Default::default()
//! };
//! let report = build_manifest(&config)?;
//! for skipped in &report.skipped {
//!     eprintln!("{} is not a valid module: {}", skipped.path.display(), skipped.reason);
//! }
//! println!("indexed {} modules", report.modules_indexed());
//! # Ok(())
//! # }
//! ```
//!
//! Installing on the client:
//!
//! ```no_run
//! use kawa_core::InstallConfig;
//! use kawa_core::TransportConfig;
//! use kawa_core::client::HttpTransport;
//! use kawa_core::client::install;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new(TransportConfig::default());
//! let report = install(&transport, "widget", &InstallConfig::default())?;
//! println!("extracted {} files", report.extraction.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod client;
pub mod config;
pub mod copy;
pub mod digest;
pub mod error;
pub mod extraction;
pub mod manifest;
pub mod report;
pub mod security;
pub mod server;
pub mod types;
pub mod verify;

#[doc(hidden)]
pub mod test_utils;

pub use archive::ModuleArchive;
pub use config::BuildConfig;
pub use config::InstallConfig;
pub use config::ServeConfig;
pub use config::TransportConfig;
pub use digest::digest;
pub use error::KawaError;
pub use error::Result;
pub use extraction::extract;
pub use extraction::extract_archive;
pub use manifest::build_manifest;
pub use report::BuildReport;
pub use report::ExtractionReport;
pub use report::SkippedArchive;
pub use verify::verify_archive;
