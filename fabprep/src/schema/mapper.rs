//! Header Mapper
//!
//! Resolves the raw column names of one table to canonical fields. Columns
//! that match nothing are kept aside as unmapped; they are common in tool
//! exports (Datasheet, DNP, Package...) and never an error.

use super::aliases::AliasRegistry;
use super::{CanonicalField, TableKind};
use crate::core::FabPrepError;
use crate::table::RawRow;

/// Canonical field → column position, built once per input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMapping {
    kind: TableKind,
    columns: Vec<(CanonicalField, usize)>,
    unmapped: Vec<String>,
    duplicates: Vec<(CanonicalField, String)>,
}

impl HeaderMapping {
    /// Map every raw column through the alias registry. If two columns
    /// resolve to the same field, the first one wins.
    pub fn build(kind: TableKind, raw_columns: &[String]) -> Self {
        let registry = AliasRegistry::for_kind(kind);
        let mut columns: Vec<(CanonicalField, usize)> = Vec::new();
        let mut unmapped = Vec::new();
        let mut duplicates = Vec::new();

        for (index, raw) in raw_columns.iter().enumerate() {
            match registry.lookup(raw) {
                Some(field) if columns.iter().any(|(f, _)| *f == field) => {
                    tracing::debug!("Column '{}' also maps to {}, keeping the first", raw, field);
                    duplicates.push((field, raw.clone()));
                }
                Some(field) => {
                    tracing::debug!("Column '{}' -> {}", raw, field);
                    columns.push((field, index));
                }
                None => unmapped.push(raw.clone()),
            }
        }

        Self {
            kind,
            columns,
            unmapped,
            duplicates,
        }
    }

    /// Build the mapping and reject it if any required field is missing.
    pub fn resolve(kind: TableKind, raw_columns: &[String]) -> Result<Self, FabPrepError> {
        let mapping = Self::build(kind, raw_columns);
        match mapping.missing_required().first() {
            Some(field) => Err(FabPrepError::MissingColumn { kind, field: *field }),
            None => Ok(mapping),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Column position mapped to a field.
    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, index)| *index)
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.column(field).is_some()
    }

    /// Trimmed cell text for a field; `None` when the field is unmapped or
    /// the row is too short.
    pub fn value<'r>(&self, field: CanonicalField, row: &'r RawRow) -> Option<&'r str> {
        self.column(field)
            .and_then(|index| row.get(index))
            .map(str::trim)
    }

    /// Required fields of this table kind with no matching column, in
    /// declaration order.
    pub fn missing_required(&self) -> Vec<CanonicalField> {
        self.kind
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !self.contains(*field))
            .collect()
    }

    /// Mapped fields in column order.
    pub fn mapped(&self) -> &[(CanonicalField, usize)] {
        &self.columns
    }

    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }

    /// Columns ignored because an earlier column already claimed their field.
    pub fn duplicates(&self) -> &[(CanonicalField, String)] {
        &self.duplicates
    }
}
