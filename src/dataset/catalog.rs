//! Attribute catalog: the `Code` -> `Name` mapping table, enriched at load time
//! with the observation table each code's column actually lives in.
//!
//! Every attribute the UI can request must resolve to exactly one catalog entry
//! and exactly one observation table. The table membership is determined by an
//! explicit schema check when the catalog is built, so a bad code fails fast
//! with [`QueryError::AttributeNotFound`] instead of surfacing as a missing
//! column deep inside a polars query.

use crate::dataset::error::DataLoadError;
use crate::error::QueryError;
use log::warn;
use polars::prelude::DataFrame;
use std::collections::HashMap;

/// Which of the two observation tables carries a given attribute column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// The "small" parameter set (irradiance, cloud, UV, ...).
    Small,
    /// The "large" parameter set (temperature, precipitation, soil, wind, ...).
    Large,
}

/// A catalog code resolved to its display name and backing table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAttribute {
    pub code: String,
    pub name: String,
    pub table: TableKind,
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    name: String,
    table: Option<TableKind>,
}

/// The Code -> Name mapping table used to label attributes in the UI.
#[derive(Debug, Clone)]
pub struct Catalog {
    codes: Vec<String>,
    entries: HashMap<String, CatalogEntry>,
}

impl Catalog {
    /// Builds the catalog from the mapping frame, checking each code against
    /// the schemas of the two observation tables.
    pub(crate) fn from_frames(
        mapping: &DataFrame,
        small: &DataFrame,
        large: &DataFrame,
    ) -> Result<Self, DataLoadError> {
        let code_col = mapping
            .column("Code")
            .and_then(|c| Ok(c.str()?.clone()))
            .map_err(|e| DataLoadError::MissingColumn {
                table: "mapping".to_string(),
                column: "Code".to_string(),
                source: e,
            })?;
        let name_col = mapping
            .column("Name")
            .and_then(|c| Ok(c.str()?.clone()))
            .map_err(|e| DataLoadError::MissingColumn {
                table: "mapping".to_string(),
                column: "Name".to_string(),
                source: e,
            })?;

        let mut codes = Vec::with_capacity(mapping.height());
        let mut entries = HashMap::with_capacity(mapping.height());
        for (code, name) in code_col.into_iter().zip(name_col.into_iter()) {
            let (Some(code), Some(name)) = (code, name) else {
                warn!("Skipping mapping row with a null Code or Name");
                continue;
            };
            let table = if has_column(small, code) {
                Some(TableKind::Small)
            } else if has_column(large, code) {
                Some(TableKind::Large)
            } else {
                warn!("Catalog code '{code}' has no column in either observation table");
                None
            };
            codes.push(code.to_string());
            entries.insert(
                code.to_string(),
                CatalogEntry {
                    name: name.to_string(),
                    table,
                },
            );
        }
        Ok(Self { codes, entries })
    }

    /// Resolves an attribute code to its display name and backing table.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::AttributeNotFound`] when the code is absent from
    /// the catalog, or present but without a column in either table.
    pub fn resolve(&self, code: &str) -> Result<ResolvedAttribute, QueryError> {
        let entry = self
            .entries
            .get(code)
            .ok_or_else(|| QueryError::AttributeNotFound(code.to_string()))?;
        let table = entry
            .table
            .ok_or_else(|| QueryError::AttributeNotFound(code.to_string()))?;
        Ok(ResolvedAttribute {
            code: code.to_string(),
            name: entry.name.clone(),
            table,
        })
    }

    /// All catalog codes in mapping-file order, for populating selectors.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}
