//! Type-safe wrappers for untrusted names and paths.
//!
//! Each type is validated upon construction and cannot be created from a
//! raw string or path without going through validation.

pub mod dest_dir;
pub mod module_name;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use module_name::ModuleName;
pub use safe_path::SafePath;
