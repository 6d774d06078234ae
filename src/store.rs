//! # JSON File Store
//!
//! File-based persistence for the expense collection. The entire collection
//! lives in a single JSON array document; every operation is a full-document
//! read and/or rewrite.
//!
//! ## File Format
//!
//! ```json
//! [
//!   {
//!     "id": "7f3a...",
//!     "amount": 42.5,
//!     "category": "Food",
//!     "description": "Lunch",
//!     "date": "2024-01-15T00:00:00Z",
//!     "createdAt": "2024-01-15T12:00:00Z"
//!   }
//! ]
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::model::Expense;

/// Whole-document store for the expense collection.
#[derive(Debug, Clone)]
pub struct ExpenseStore {
    path: PathBuf,
}

impl ExpenseStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the containing directory and an empty document if absent.
    ///
    /// Idempotent; invoked once at process startup so reads never fail due
    /// to a missing file.
    pub fn ensure_initialized(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating data directory {:?}", parent))?;
        }
        if !self.path.exists() {
            fs::write(&self.path, "[]")
                .with_context(|| format!("creating empty store at {:?}", self.path))?;
            debug!("Initialized empty expense store at {:?}", self.path);
        }
        Ok(())
    }

    /// Load and deserialize the full collection.
    ///
    /// Fail-open: any I/O or parse failure is logged and degrades to an
    /// empty collection rather than propagating.
    pub fn read_all(&self) -> Vec<Expense> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read expense store {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(expenses) => expenses,
            Err(e) => {
                warn!("Failed to parse expense store {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    /// Serialize and replace the full collection, pretty-printed.
    ///
    /// Uses the temp-file-then-rename pattern so a crashed write never
    /// leaves a truncated document behind.
    pub fn write_all(&self, expenses: &[Expense]) -> Result<()> {
        let contents = serde_json::to_string_pretty(expenses)?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("writing expense store temp file {:?}", temp_path))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("replacing expense store {:?}", self.path))?;

        debug!("Wrote {} expenses to {:?}", expenses.len(), self.path);
        Ok(())
    }

    /// Remove the record with the given id and rewrite the document.
    ///
    /// Returns whether a matching record was actually removed, so callers
    /// can distinguish not-found from a successful delete.
    pub fn delete_by_id(&self, id: &str) -> Result<bool> {
        let mut expenses = self.read_all();
        let original_len = expenses.len();
        expenses.retain(|e| e.id != id);

        if expenses.len() == original_len {
            return Ok(false);
        }

        self.write_all(&expenses)?;
        Ok(true)
    }
}
