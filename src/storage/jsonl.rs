//! JSONL (JSON Lines) storage.
//!
//! Each line is a valid JSON object representing one document.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{StorageConfig, StorageError};

/// Document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Player,
    TeamAggregate,
}

impl EntityType {
    /// Get the filename for this entity type.
    pub fn filename(&self) -> &'static str {
        match self {
            EntityType::Player => "players.jsonl",
            EntityType::TeamAggregate => "team_aggregate.jsonl",
        }
    }
}

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.entity_path(entity))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append a single document to the file.
    pub fn append(&self, entity: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        let json = serde_json::to_string(entity)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        debug!("Appended document to {:?}", self.path);
        Ok(())
    }

    /// Write documents, replacing the entire file.
    ///
    /// Content goes to a sibling temp file first and is renamed into place,
    /// so readers never observe a half-written collection.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let tmp_path = self.path.with_extension("jsonl.tmp");
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        drop(writer);
        fs::rename(&tmp_path, &self.path)?;
        debug!("Wrote {} documents to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn for_entity(config: &StorageConfig, entity: EntityType) -> Self {
        Self::new(config.entity_path(entity))
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read all documents from the file. Unparseable lines are skipped with
    /// a warning.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entities = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    warn!("Failed to parse line {} in {:?}: {}", idx + 1, self.path, e);
                }
            }
        }

        debug!("Read {} documents from {:?}", entities.len(), self.path);
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestDoc {
        id: String,
        value: u32,
    }

    fn doc(id: &str, value: u32) -> TestDoc {
        TestDoc {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn test_jsonl_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("test.jsonl");

        let writer: JsonlWriter<TestDoc> = JsonlWriter::new(path.clone());
        let count = writer.write_all(&[doc("1", 100), doc("2", 200)]).unwrap();
        assert_eq!(count, 2);

        let reader: JsonlReader<TestDoc> = JsonlReader::new(path);
        let read = reader.read_all().unwrap();

        assert_eq!(read, vec![doc("1", 100), doc("2", 200)]);
    }

    #[test]
    fn test_jsonl_write_all_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("replace.jsonl");

        let writer: JsonlWriter<TestDoc> = JsonlWriter::new(path.clone());
        writer.write_all(&[doc("1", 1), doc("2", 2)]).unwrap();
        writer.write_all(&[doc("3", 3)]).unwrap();

        let reader: JsonlReader<TestDoc> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), vec![doc("3", 3)]);
    }

    #[test]
    fn test_jsonl_append() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("append.jsonl");

        let writer: JsonlWriter<TestDoc> = JsonlWriter::new(path.clone());
        let reader: JsonlReader<TestDoc> = JsonlReader::new(path);

        writer.append(&doc("1", 100)).unwrap();
        writer.append(&doc("2", 200)).unwrap();

        assert_eq!(reader.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_jsonl_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let reader: JsonlReader<TestDoc> =
            JsonlReader::new(temp_dir.path().join("nonexistent.jsonl"));

        assert!(!reader.exists());
        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_jsonl_skips_bad_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"id\":\"1\",\"value\":1}\nnot json\n\n{\"id\":\"2\",\"value\":2}\n")
            .unwrap();

        let reader: JsonlReader<TestDoc> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), vec![doc("1", 1), doc("2", 2)]);
    }
}
