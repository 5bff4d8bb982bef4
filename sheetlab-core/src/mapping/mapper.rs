//! Fuzzy header-to-field mapping.
//!
//! Each canonical field independently claims its best-scoring header above
//! the match threshold. Because fields match independently, two fields can
//! claim the same header; `validate_mappings` reports that instead of the
//! matcher preventing it.

use super::catalog::{CanonicalField, FieldCatalog};
use super::similarity::similarity;
use serde::Serialize;

/// Minimum similarity for a header to count as a field match.
const MATCH_THRESHOLD: f64 = 0.7;
/// Minimum similarity for a reverse suggestion on an unmapped header.
const SUGGESTION_THRESHOLD: f64 = 0.6;
/// Required-field confidence below which validation raises an issue.
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// One canonical field's resolved mapping.
#[derive(Debug, Clone, Serialize)]
pub struct FieldMapping {
    pub field: CanonicalField,
    /// Original header claimed by this field, if any cleared the threshold.
    pub header: Option<String>,
    pub confidence: f64,
    pub description: String,
}

/// Best-effort hint for a header no field claimed.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub header: String,
    pub field: CanonicalField,
    pub confidence: f64,
}

/// Output of mapping one file's header row.
#[derive(Debug, Clone, Serialize)]
pub struct MappingResult {
    pub mappings: Vec<FieldMapping>,
    pub unmapped_columns: Vec<String>,
    pub suggestions: Vec<Suggestion>,
    /// Importance-weighted mean confidence over the mapped fields.
    pub confidence: f64,
}

impl MappingResult {
    /// Mapping entry for a field, if the catalog defines it.
    pub fn get(&self, field: CanonicalField) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.field == field)
    }

    /// The header claimed by a field, if it was mapped.
    pub fn header_for(&self, field: CanonicalField) -> Option<&str> {
        self.get(field).and_then(|m| m.header.as_deref())
    }
}

/// Validation findings; reported, never thrown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MappingIssue {
    RequiredUnmapped {
        field: CanonicalField,
    },
    LowConfidence {
        field: CanonicalField,
        confidence: f64,
    },
    DuplicateHeader {
        header: String,
        fields: Vec<CanonicalField>,
    },
}

impl std::fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingIssue::RequiredUnmapped { field } => {
                write!(f, "required field '{field}' matched no column")
            }
            MappingIssue::LowConfidence { field, confidence } => {
                write!(f, "required field '{field}' mapped at low confidence {confidence:.2}")
            }
            MappingIssue::DuplicateHeader { header, fields } => {
                let names: Vec<String> = fields.iter().map(|c| c.to_string()).collect();
                write!(f, "column '{header}' claimed by multiple fields: {}", names.join(", "))
            }
        }
    }
}

/// Maps raw headers onto canonical fields using a fixed catalog.
#[derive(Debug, Clone)]
pub struct ColumnMapper {
    catalog: FieldCatalog,
}

impl ColumnMapper {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Map a header row. Deterministic: the same headers always produce the
    /// same mappings and confidences.
    pub fn map_columns(&self, headers: &[String]) -> MappingResult {
        let mut mappings = Vec::with_capacity(self.catalog.fields.len());

        for spec in &self.catalog.fields {
            let mut best: Option<(&String, f64)> = None;
            for header in headers {
                let score = spec
                    .variations
                    .iter()
                    .map(|v| similarity(header, v))
                    .fold(0.0, f64::max);
                // Strictly-better keeps the earliest header on ties, so the
                // result is independent of catalog iteration quirks.
                if score > MATCH_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
                    best = Some((header, score));
                }
            }

            mappings.push(FieldMapping {
                field: spec.field,
                header: best.map(|(h, _)| h.clone()),
                confidence: best.map_or(0.0, |(_, s)| s),
                description: spec.description.clone(),
            });
        }

        let claimed: Vec<&str> = mappings.iter().filter_map(|m| m.header.as_deref()).collect();
        let unmapped_columns: Vec<String> = headers
            .iter()
            .filter(|h| !claimed.contains(&h.as_str()))
            .cloned()
            .collect();

        let suggestions = unmapped_columns
            .iter()
            .filter_map(|header| self.suggest(header))
            .collect();

        let (weight_sum, weighted) = self
            .catalog
            .fields
            .iter()
            .zip(&mappings)
            .filter(|(_, m)| m.header.is_some())
            .fold((0.0, 0.0), |(ws, acc), (spec, m)| {
                (ws + spec.weight, acc + spec.weight * m.confidence)
            });
        let confidence = if weight_sum > 0.0 { weighted / weight_sum } else { 0.0 };

        MappingResult {
            mappings,
            unmapped_columns,
            suggestions,
            confidence,
        }
    }

    /// Reverse lookup: the closest field for an unmapped header.
    fn suggest(&self, header: &str) -> Option<Suggestion> {
        let mut best: Option<(CanonicalField, f64)> = None;
        for spec in &self.catalog.fields {
            let score = spec
                .variations
                .iter()
                .map(|v| similarity(header, v))
                .fold(0.0, f64::max);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((spec.field, score));
            }
        }
        best.filter(|(_, s)| *s > SUGGESTION_THRESHOLD)
            .map(|(field, confidence)| Suggestion {
                header: header.to_string(),
                field,
                confidence,
            })
    }

    /// Check a mapping result against the catalog's required-field policy.
    pub fn validate_mappings(&self, result: &MappingResult) -> Vec<MappingIssue> {
        let mut issues = Vec::new();

        for spec in self.catalog.fields.iter().filter(|s| s.required) {
            match result.get(spec.field) {
                Some(m) if m.header.is_some() => {
                    if m.confidence < LOW_CONFIDENCE_THRESHOLD {
                        issues.push(MappingIssue::LowConfidence {
                            field: spec.field,
                            confidence: m.confidence,
                        });
                    }
                }
                _ => issues.push(MappingIssue::RequiredUnmapped { field: spec.field }),
            }
        }

        // Two fields claiming one header: fields map independently, so the
        // collision surfaces here.
        let mut seen: Vec<(&str, Vec<CanonicalField>)> = Vec::new();
        for m in &result.mappings {
            if let Some(header) = m.header.as_deref() {
                match seen.iter_mut().find(|(h, _)| *h == header) {
                    Some((_, fields)) => fields.push(m.field),
                    None => seen.push((header, vec![m.field])),
                }
            }
        }
        for (header, fields) in seen {
            if fields.len() > 1 {
                issues.push(MappingIssue::DuplicateHeader {
                    header: header.to_string(),
                    fields,
                });
            }
        }

        issues
    }
}

impl Default for ColumnMapper {
    fn default() -> Self {
        Self::new(FieldCatalog::default())
    }
}
