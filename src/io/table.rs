//! The table serializer seam and the column chunks handed to it.

use std::io;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<String>),
    Integer(Vec<i64>),
    Float(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Integer(v) => v.len(),
            Column::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn as_floats(&self) -> Option<&[f64]> {
        match self { Column::Float(v) => Some(v), _ => None }
    }

    pub fn as_integers(&self) -> Option<&[i64]> {
        match self { Column::Integer(v) => Some(v), _ => None }
    }

    pub fn as_texts(&self) -> Option<&[String]> {
        match self { Column::Text(v) => Some(v), _ => None }
    }
}

/// One case's rows, column by column, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnChunk {
    columns: Vec<(String, Column)>,
}

impl ColumnChunk {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, name: impl Into<String>, column: Column) {
        self.columns.push((name.into(), column));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Row count, taken from the first column.
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaMismatch {
    #[error("column {position} is '{actual}', expected '{expected}'")]
    Order { position: usize, expected: String, actual: String },
    #[error("expected {expected} columns, got {actual}")]
    Width { expected: usize, actual: usize },
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    Length { column: String, expected: usize, actual: usize },
}

/// Column names of the table, fixed before the first case runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableSchema {
    columns: Vec<String>,
}

impl TableSchema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { columns: columns.into_iter().map(Into::into).collect() }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize { self.columns.len() }
    pub fn is_empty(&self) -> bool { self.columns.is_empty() }

    /// Checks names, order and that every column has the same number of
    /// rows. Returns that row count.
    pub fn check(&self, chunk: &ColumnChunk) -> Result<usize, SchemaMismatch> {
        if chunk.columns().len() != self.columns.len() {
            return Err(SchemaMismatch::Width { expected: self.columns.len(), actual: chunk.columns().len() });
        }
        let rows = chunk.rows();
        for (position, (expected, (name, column))) in self.columns.iter().zip(chunk.columns()).enumerate() {
            if expected != name {
                return Err(SchemaMismatch::Order {
                    position,
                    expected: expected.clone(),
                    actual: name.clone(),
                });
            }
            if column.len() != rows {
                return Err(SchemaMismatch::Length { column: name.clone(), expected: rows, actual: column.len() });
            }
        }
        Ok(rows)
    }
}

/// Append-only table output. A chunk write either fully succeeds or fails.
pub trait TableSink {
    fn add_header(&mut self, text: &str) -> io::Result<()>;
    fn add_columns_chunk(&mut self, chunk: &ColumnChunk) -> io::Result<()>;
    fn add_footer(&mut self, text: &str) -> io::Result<()>;
}

impl<T: TableSink + ?Sized> TableSink for &mut T {
    fn add_header(&mut self, text: &str) -> io::Result<()> {
        (**self).add_header(text)
    }

    fn add_columns_chunk(&mut self, chunk: &ColumnChunk) -> io::Result<()> {
        (**self).add_columns_chunk(chunk)
    }

    fn add_footer(&mut self, text: &str) -> io::Result<()> {
        (**self).add_footer(text)
    }
}

/// Collects everything written to it.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub header: Option<String>,
    pub chunks: Vec<ColumnChunk>,
    pub footer: Option<String>,
}

impl MemoryTable {
    pub fn new() -> Self { Self::default() }

    pub fn rows(&self) -> usize {
        self.chunks.iter().map(ColumnChunk::rows).sum()
    }

    /// All values of a float column across chunks.
    pub fn floats(&self, name: &str) -> Vec<f64> {
        self.chunks
            .iter()
            .filter_map(|c| c.get(name).and_then(Column::as_floats))
            .flatten()
            .copied()
            .collect()
    }

    pub fn integers(&self, name: &str) -> Vec<i64> {
        self.chunks
            .iter()
            .filter_map(|c| c.get(name).and_then(Column::as_integers))
            .flatten()
            .copied()
            .collect()
    }

    pub fn texts(&self, name: &str) -> Vec<String> {
        self.chunks
            .iter()
            .filter_map(|c| c.get(name).and_then(Column::as_texts))
            .flatten()
            .cloned()
            .collect()
    }
}

impl TableSink for MemoryTable {
    fn add_header(&mut self, text: &str) -> io::Result<()> {
        self.header = Some(text.to_string());
        Ok(())
    }

    fn add_columns_chunk(&mut self, chunk: &ColumnChunk) -> io::Result<()> {
        self.chunks.push(chunk.clone());
        Ok(())
    }

    fn add_footer(&mut self, text: &str) -> io::Result<()> {
        self.footer = Some(text.to_string());
        Ok(())
    }
}
