//! Seams to the outside world: file loaders and the table sink.
pub mod loaders;
pub mod memory;
pub mod table;

pub use loaders::{FieldLoader, LoadError, ObservationLoader, PathTemplates};
pub use memory::MemoryStore;
pub use table::{Column, ColumnChunk, MemoryTable, SchemaMismatch, TableSchema, TableSink};
