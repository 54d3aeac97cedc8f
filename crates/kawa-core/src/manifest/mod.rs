//! Manifest building and the manifest document model.
//!
//! A manifest is a flat directory of JSON documents describing every
//! module archive found under a root: one index listing name and version
//! of each module, plus one detail document per module with its metadata
//! and a SHA-256 digest of every file it contains.

pub mod builder;
pub mod model;
pub mod store;
pub mod validator;

pub use builder::build_manifest;
pub use builder::discover_archives;
pub use model::Descriptor;
pub use model::FileDigest;
pub use model::ManifestIndex;
pub use model::ModuleDetail;
pub use model::ModuleIndexEntry;
pub use store::INDEX_FILE_NAME;
pub use store::ManifestStore;
pub use validator::InvalidReason;
pub use validator::ModuleIdentity;
pub use validator::Validation;
pub use validator::validate;
