//! Header-to-canonical-field mapping: similarity scoring, the field catalog,
//! and the fuzzy mapper.

pub mod catalog;
pub mod mapper;
pub mod similarity;

pub use catalog::{CanonicalField, FieldCatalog, FieldSpec};
pub use mapper::{ColumnMapper, FieldMapping, MappingIssue, MappingResult, Suggestion};
pub use similarity::{levenshtein, similarity};
