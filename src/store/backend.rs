// 💾 Snapshot Backends - Where whole documents live
//
// The store never writes partial records: every save replaces one complete
// JSON document. A backend only has to load and replace documents by name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// The persisted documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Sessions,
    Transactions,
    Bankrolls,
    Locations,
    Stakes,
}

impl Document {
    pub const ALL: [Document; 5] = [
        Document::Sessions,
        Document::Transactions,
        Document::Bankrolls,
        Document::Locations,
        Document::Stakes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Document::Sessions => "sessions",
            Document::Transactions => "transactions",
            Document::Bankrolls => "bankrolls",
            Document::Locations => "locations",
            Document::Stakes => "stakes",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

/// Storage for whole JSON documents
pub trait SnapshotBackend: Send {
    /// Read a document. `Ok(None)` when it has never been saved.
    fn load(&self, document: Document) -> Result<Option<String>, StoreError>;

    /// Replace a document with `json`
    fn save(&mut self, document: Document, json: &str) -> Result<(), StoreError>;

    /// Short name for logs
    fn kind(&self) -> &str;
}

// ============================================================================
// JSON DIRECTORY
// ============================================================================

/// One `<document>.json` file per document in a directory.
///
/// Saves go to `<document>.json.tmp` first and are renamed over the target,
/// so a crash mid-write leaves the previous document intact.
pub struct JsonDirectory {
    dir: PathBuf,
}

impl JsonDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonDirectory { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, document: Document) -> PathBuf {
        self.dir.join(document.file_name())
    }
}

impl SnapshotBackend for JsonDirectory {
    fn load(&self, document: Document) -> Result<Option<String>, StoreError> {
        let path = self.path_for(document);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn save(&mut self, document: Document, json: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        let target = self.path_for(document);
        let tmp = self.dir.join(format!("{}.tmp", document.file_name()));

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &target)?;

        Ok(())
    }

    fn kind(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_document_loads_as_none() {
        let tmp = TempDir::new().unwrap();
        let backend = JsonDirectory::new(tmp.path());

        assert!(backend.load(Document::Sessions).unwrap().is_none());
    }

    #[test]
    fn test_save_replaces_whole_document() {
        let tmp = TempDir::new().unwrap();
        let mut backend = JsonDirectory::new(tmp.path().join("nested"));

        backend.save(Document::Stakes, r#"["1/2","2/5"]"#).unwrap();
        backend.save(Document::Stakes, r#"["5/10"]"#).unwrap();

        assert_eq!(
            backend.load(Document::Stakes).unwrap().as_deref(),
            Some(r#"["5/10"]"#)
        );
        assert!(!tmp.path().join("nested").join("stakes.json.tmp").exists());
    }

    #[test]
    fn test_document_file_names() {
        let names: Vec<String> = Document::ALL.iter().map(|d| d.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "sessions.json",
                "transactions.json",
                "bankrolls.json",
                "locations.json",
                "stakes.json"
            ]
        );
    }
}
