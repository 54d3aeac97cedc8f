//! Manifest document schemas.
//!
//! Two documents make up the store: the index (`manifest.json`) and one
//! detail document per module (`<name>.json`). Each has a concrete schema
//! and a `check_schema` step run after decoding, so a structurally valid
//! but semantically broken document is rejected as [`KawaError::Schema`].

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::KawaError;
use crate::Result;
use crate::digest::is_valid_digest;
use crate::types::ModuleName;

/// One module's entry in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleIndexEntry {
    /// Module name, unique within the index.
    pub name: String,
    /// Opaque version string.
    pub version: String,
}

/// The index document listing every published module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIndex {
    /// Modules in discovery order.
    pub modules: Vec<ModuleIndexEntry>,
}

impl ManifestIndex {
    /// Looks up a module by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ModuleIndexEntry> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Checks that every entry has a safe, unique name and a non-empty
    /// version.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::Schema`] describing the first violation.
    pub fn check_schema(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.modules {
            ModuleName::parse(&entry.name)
                .map_err(|_| KawaError::schema("index", format!("invalid module name {:?}", entry.name)))?;
            if entry.version.is_empty() {
                return Err(KawaError::schema(
                    "index",
                    format!("module {} has an empty version", entry.name),
                ));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(KawaError::schema(
                    "index",
                    format!("module {} is listed twice", entry.name),
                ));
            }
        }
        Ok(())
    }
}

/// The digest of one file inside a module archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    /// Base name of the archive entry.
    pub filename: String,
    /// Lowercase hex SHA-256 of the entry's decompressed bytes.
    #[serde(rename = "hash")]
    pub digest: String,
}

/// Full metadata and file digests for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDetail {
    /// Module name.
    pub name: String,
    /// Opaque version string.
    pub version: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Author.
    #[serde(default)]
    pub author: String,
    /// Source repository URL.
    #[serde(rename = "repo", default)]
    pub repository: String,
    /// One digest per non-directory archive entry, in archive order.
    #[serde(default)]
    pub files: Vec<FileDigest>,
}

impl ModuleDetail {
    /// Returns the index entry corresponding to this detail document.
    #[must_use]
    pub fn index_entry(&self) -> ModuleIndexEntry {
        ModuleIndexEntry {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }

    /// Checks identity fields and digest formats.
    ///
    /// # Errors
    ///
    /// Returns [`KawaError::Schema`] describing the first violation.
    pub fn check_schema(&self) -> Result<()> {
        ModuleName::parse(&self.name)
            .map_err(|_| KawaError::schema("detail", format!("invalid module name {:?}", self.name)))?;
        if self.version.is_empty() {
            return Err(KawaError::schema("detail", "empty version"));
        }
        if let Some(bad) = self.files.iter().find(|f| !is_valid_digest(&f.digest)) {
            return Err(KawaError::schema(
                "detail",
                format!("malformed digest for {}", bad.filename),
            ));
        }
        Ok(())
    }
}

/// The module descriptor as found inside an archive.
///
/// Every field is optional at the decoding level; validity is decided by
/// the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Descriptor {
    /// Declared module name.
    #[serde(default)]
    pub name: Option<String>,
    /// Declared version.
    #[serde(default)]
    pub version: Option<String>,
    /// Declared description.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared author.
    #[serde(default)]
    pub author: Option<String>,
    /// Declared repository URL.
    #[serde(default, alias = "repository")]
    pub repo: Option<String>,
}

impl Descriptor {
    /// Decodes a descriptor, requiring a top-level JSON object.
    ///
    /// # Errors
    ///
    /// Returns the decoding failure as text; callers treat it as an invalid
    /// archive rather than an error.
    pub fn parse(bytes: &[u8]) -> std::result::Result<Self, String> {
        let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        if !value.is_object() {
            return Err("descriptor is not a JSON object".to_string());
        }
        Self::deserialize(value).map_err(|e| e.to_string())
    }

    /// Copies the optional metadata fields present in this descriptor onto
    /// `detail`. Identity fields are left untouched.
    pub fn overlay_metadata(&self, detail: &mut ModuleDetail) {
        if let Some(description) = &self.description {
            detail.description.clone_from(description);
        }
        if let Some(author) = &self.author {
            detail.author.clone_from(author);
        }
        if let Some(repo) = &self.repo {
            detail.repository.clone_from(repo);
        }
    }
}
