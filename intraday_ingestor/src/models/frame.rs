//! Tabular result of a provider call.
//!
//! A [`RawFrame`] is a set of equally long, named, typed columns. It is the
//! shape a provider returns before anything in this crate has looked at it, so
//! nothing about which columns exist is guaranteed here. Schema checks belong
//! to the pipeline.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use thiserror::Error;

/// Column names used by the providers in this crate.
pub mod columns {
    /// Index column of intraday frames.
    pub const DATETIME: &str = "Datetime";
    /// Lowercase index name some provider responses use instead.
    pub const DATE: &str = "date";
    pub const OPEN: &str = "Open";
    pub const HIGH: &str = "High";
    pub const LOW: &str = "Low";
    pub const CLOSE: &str = "Close";
    pub const VOLUME: &str = "Volume";
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("column '{name}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' is already present")]
    DuplicateColumn(String),
}

/// One typed column. Missing cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Timestamps(Vec<NaiveDateTime>),
    Floats(Vec<Option<f64>>),
    Integers(Vec<Option<u64>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Timestamps(v) => v.len(),
            Column::Floats(v) => v.len(),
            Column::Integers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFrame {
    columns: IndexMap<String, Column>,
}

impl RawFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RawFrame::push_column`].
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<Self, FrameError> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Appends a column. Every column must have the same number of rows as
    /// the first one.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), FrameError> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(FrameError::DuplicateColumn(name));
        }
        if let Some((_, first)) = self.columns.first() {
            if first.len() != column.len() {
                return Err(FrameError::LengthMismatch {
                    name,
                    expected: first.len(),
                    actual: column.len(),
                });
            }
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Number of rows. A frame without columns has none.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn timestamps(&self, name: &str) -> Option<&[NaiveDateTime]> {
        match self.columns.get(name)? {
            Column::Timestamps(v) => Some(v),
            _ => None,
        }
    }

    pub fn floats(&self, name: &str) -> Option<&[Option<f64>]> {
        match self.columns.get(name)? {
            Column::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn integers(&self, name: &str) -> Option<&[Option<u64>]> {
        match self.columns.get(name)? {
            Column::Integers(v) => Some(v),
            _ => None,
        }
    }
}
