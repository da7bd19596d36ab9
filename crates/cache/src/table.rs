//! Arrow IPC (Feather v2) tables.

use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use arrow::datatypes::SchemaRef;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use exn::ResultExt;

use crate::error::{ErrorKind, Result};

/// One exported table: a schema and its record batches.
///
/// Equality compares the schema and every batch value by value.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Table {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self { schema, batches }
    }

    /// Reads a table from an Arrow IPC file on disk.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = fs::File::open(path).or_raise(|| ErrorKind::TableDecode(path.to_path_buf()))?;
        Self::from_reader(file).or_raise(|| ErrorKind::TableDecode(path.to_path_buf()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes)).or_raise(|| ErrorKind::TableDecode(PathBuf::new()))
    }

    fn from_reader<R: Read + Seek>(reader: R) -> std::result::Result<Self, arrow::error::ArrowError> {
        let reader = FileReader::try_new(reader, None)?;
        let schema = reader.schema();
        let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { schema, batches })
    }

    /// Serialises the table in the Arrow IPC file format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        {
            let mut writer = FileWriter::try_new(&mut buffer, &self.schema).or_raise(|| ErrorKind::TableEncode)?;
            for batch in &self.batches {
                writer.write(batch).or_raise(|| ErrorKind::TableEncode)?;
            }
            writer.finish().or_raise(|| ErrorKind::TableEncode)?;
        }
        Ok(buffer)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).or_raise(|| ErrorKind::CachePersist(path.to_path_buf()))
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.fields().iter().map(|field| field.name().as_str()).collect()
    }
}
