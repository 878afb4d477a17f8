use log::debug;
use serde_json::{Map, Value as JsonValue};
use std::collections::{HashMap, HashSet};

use crate::error::{MindsLinkError, Result};

/// Column-oriented result set decoded from a `"table"` response.
///
/// Column order follows the wire payload and every column holds exactly
/// [`row_count`](Self::row_count) values. Names are unique: a repeated wire
/// name (e.g. from a join) gets the first free `_<n>` suffix, so
/// `["price", "sqft", "price"]` decodes as `["price", "sqft", "price_1"]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularResult {
    column_names: Vec<String>,
    columns: HashMap<String, Vec<JsonValue>>,
    row_count: usize,
}

impl TabularResult {
    /// Result with no columns and no rows
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from row-major wire data.
    ///
    /// Repeated column names are suffixed. Fails when a row's width differs
    /// from the number of columns.
    pub fn from_rows(column_names: Vec<String>, data: Vec<Vec<JsonValue>>) -> Result<Self> {
        let column_names = unique_column_names(column_names);

        let row_count = data.len();
        let mut buffers: Vec<Vec<JsonValue>> =
            (0..column_names.len()).map(|_| Vec::with_capacity(row_count)).collect();

        for (row_idx, row) in data.into_iter().enumerate() {
            if row.len() != column_names.len() {
                return Err(MindsLinkError::TransportError(format!(
                    "Row {} has {} values, expected {}",
                    row_idx,
                    row.len(),
                    column_names.len()
                )));
            }
            for (buffer, value) in buffers.iter_mut().zip(row) {
                buffer.push(value);
            }
        }

        let columns = column_names.iter().cloned().zip(buffers).collect();
        Ok(Self {
            column_names,
            columns,
            row_count,
        })
    }

    /// Column names in wire order
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Values of one column; exact match first, then case-insensitive
    pub fn column(&self, name: &str) -> Option<&[JsonValue]> {
        if let Some(values) = self.columns.get(name) {
            return Some(values);
        }
        let actual = self.resolve_name(name)?;
        self.columns.get(actual).map(Vec::as_slice)
    }

    /// Borrowed view of one row
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.row_count).then_some(Row {
            result: self,
            index,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.row_count).map(move |index| Row {
            result: self,
            index,
        })
    }

    /// Same data with every column name lowercased
    pub fn to_lowercase_columns(&self) -> Result<Self> {
        let lowered: Vec<String> = self.column_names.iter().map(|c| c.to_lowercase()).collect();
        let data = self
            .rows()
            .map(|row| row.values().cloned().collect())
            .collect();
        Self::from_rows(lowered, data)
    }

    fn resolve_name(&self, name: &str) -> Option<&str> {
        self.column_names
            .iter()
            .find(|c| c.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}

/// Suffix repeated names with `_1`, `_2`, ... skipping any name that already
/// appears on the wire.
fn unique_column_names(names: Vec<String>) -> Vec<String> {
    let original: HashSet<String> = names.iter().cloned().collect();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut unique = Vec::with_capacity(names.len());

    for name in names {
        if taken.insert(name.clone()) {
            unique.push(name);
            continue;
        }
        let mut n = 1;
        let renamed = loop {
            let candidate = format!("{}_{}", name, n);
            if !original.contains(&candidate) && !taken.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        debug!("[MINDS_QUERY] Renamed repeated column {} to {}", name, renamed);
        taken.insert(renamed.clone());
        unique.push(renamed);
    }
    unique
}

/// One row of a [`TabularResult`]
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    result: &'a TabularResult,
    index: usize,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value by column name, case-insensitive
    pub fn get(&self, column: &str) -> Option<&'a JsonValue> {
        self.result.column(column).and_then(|values| values.get(self.index))
    }

    /// Values in column order
    pub fn values(&self) -> impl Iterator<Item = &'a JsonValue> + 'a {
        let result = self.result;
        let index = self.index;
        result
            .column_names
            .iter()
            .filter_map(move |name| result.columns.get(name).and_then(|v| v.get(index)))
    }

    /// `(column, value)` pairs in column order
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, &'a JsonValue)> + 'a {
        self.result
            .column_names
            .iter()
            .map(String::as_str)
            .zip(self.values())
    }

    /// Row as a JSON object keyed by column name
    pub fn to_map(&self) -> Map<String, JsonValue> {
        self.entries()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}
