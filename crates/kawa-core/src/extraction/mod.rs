//! Safe extraction of module archives.

mod extractor;

pub use extractor::extract;
pub use extractor::extract_archive;
