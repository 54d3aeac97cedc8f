//! Module archive validation.

use std::fmt;

use tracing::debug;

use super::model::Descriptor;
use crate::Result;
use crate::archive::ModuleArchive;
use crate::types::ModuleName;

/// Identity and metadata of a module that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentity {
    /// Validated module name.
    pub name: ModuleName,
    /// Non-empty version string.
    pub version: String,
    /// The descriptor the identity was read from.
    pub descriptor: Descriptor,
}

/// Why an archive is not a publishable module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// No entry has the descriptor's base name.
    MissingDescriptor,
    /// The descriptor is not a JSON object of the expected shape.
    MalformedDescriptor(String),
    /// A required field is absent or empty.
    MissingField(&'static str),
    /// The declared name cannot be used as a file name.
    UnsafeName(String),
    /// An earlier archive already published this name.
    DuplicateName(String),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDescriptor => f.write_str("no module descriptor"),
            Self::MalformedDescriptor(reason) => write!(f, "malformed descriptor: {reason}"),
            Self::MissingField(field) => write!(f, "descriptor has no {field}"),
            Self::UnsafeName(name) => write!(f, "unsafe module name {name:?}"),
            Self::DuplicateName(name) => write!(f, "module {name} already published by an earlier archive"),
        }
    }
}

/// Outcome of validating one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The archive is a module.
    Valid(ModuleIdentity),
    /// The archive is skipped.
    Invalid(InvalidReason),
}

/// Decides whether `archive` is a valid module.
///
/// The first non-directory entry whose base name equals `descriptor_name`
/// is decoded; it must be a JSON object with a non-empty `name` and
/// `version`. Unknown fields are ignored. Validation failures are returned
/// as [`Validation::Invalid`], never as errors.
///
/// # Errors
///
/// Returns [`KawaError::EntryRead`](crate::KawaError::EntryRead) if the
/// archive is corrupt while listing or reading the descriptor.
pub fn validate(archive: &mut ModuleArchive, descriptor_name: &str) -> Result<Validation> {
    let entries = archive.entries()?;
    let Some(meta) = entries
        .iter()
        .find(|e| !e.is_dir && e.base_name() == descriptor_name)
    else {
        return Ok(Validation::Invalid(InvalidReason::MissingDescriptor));
    };

    debug!(archive = %archive.path().display(), entry = %meta.name, "reading descriptor");
    let bytes = archive.read_entry(meta)?;
    Ok(check_descriptor(&bytes))
}

/// Applies the descriptor rules to raw descriptor bytes.
#[must_use]
pub fn check_descriptor(bytes: &[u8]) -> Validation {
    let descriptor = match Descriptor::parse(bytes) {
        Ok(descriptor) => descriptor,
        Err(reason) => return Validation::Invalid(InvalidReason::MalformedDescriptor(reason)),
    };

    let name = match descriptor.name.as_deref() {
        None | Some("") => return Validation::Invalid(InvalidReason::MissingField("name")),
        Some(name) => name,
    };
    let version = match descriptor.version.as_deref() {
        None | Some("") => return Validation::Invalid(InvalidReason::MissingField("version")),
        Some(version) => version.to_string(),
    };
    let Ok(name) = ModuleName::parse(name) else {
        return Validation::Invalid(InvalidReason::UnsafeName(name.to_string()));
    };

    Validation::Valid(ModuleIdentity {
        name,
        version,
        descriptor,
    })
}
