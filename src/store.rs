use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{InvoiceError, Result};
use crate::model::{StoreDocument, TemplateRecord};

/// Owner of the on-disk invoice data file.
///
/// Every mutation is a single load-mutate-save cycle; the whole document is
/// rewritten on save. There is no file locking: the tool assumes a single
/// invocation at a time against a given store file, and concurrent
/// invocations lose updates (last save wins).
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the backing file, or returns the zero-value document if it does
    /// not exist. An unreadable or non-object file is an error; missing or
    /// wrongly-typed fields inside the object are tolerated by defaulting,
    /// so partially-written files from older versions keep loading.
    pub fn load(&self) -> Result<StoreDocument> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| InvoiceError::CorruptStore {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        let root = value.as_object().ok_or_else(|| InvoiceError::CorruptStore {
            path: self.path.clone(),
            reason: "expected a JSON object at the top level".to_string(),
        })?;
        Ok(StoreDocument {
            last_invoice_number: root
                .get("last_invoice_number")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            templates: root
                .get("templates")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Serializes the full document and overwrites the backing file,
    /// creating parent directories as needed.
    pub fn save(&self, doc: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Sequential invoice numbering on top of [`Store`].
pub struct Numbering<'a> {
    store: &'a Store,
}

impl<'a> Numbering<'a> {
    pub fn new(store: &'a Store) -> Self {
        Numbering { store }
    }

    /// Increments the counter by one, persists it, and returns the new
    /// number. The only way the counter advances during generation.
    pub fn allocate_next(&self) -> Result<String> {
        let mut doc = self.store.load()?;
        doc.last_invoice_number += 1;
        self.store.save(&doc)?;
        Ok(format_invoice_number(doc.last_invoice_number))
    }

    /// Returns the current counter value without mutating the store.
    pub fn peek_current(&self) -> Result<String> {
        Ok(format_invoice_number(self.store.load()?.last_invoice_number))
    }
}

/// Zero-pads to at least four digits; wider numbers are never truncated.
pub fn format_invoice_number(n: u64) -> String {
    format!("{n:04}")
}

/// Named-template persistence on top of [`Store`].
pub struct TemplateRegistry<'a> {
    store: &'a Store,
}

impl<'a> TemplateRegistry<'a> {
    pub fn new(store: &'a Store) -> Self {
        TemplateRegistry { store }
    }

    /// Upserts a template under `name`, overwriting any existing one.
    pub fn save(&self, name: &str, record: &TemplateRecord) -> Result<()> {
        if name.trim().is_empty() {
            return Err(InvoiceError::MissingRequiredField("template name"));
        }
        let mut doc = self.store.load()?;
        doc.templates
            .insert(name.to_string(), serde_json::to_value(record)?);
        self.store.save(&doc)
    }

    pub fn load(&self, name: &str) -> Result<TemplateRecord> {
        let doc = self.store.load()?;
        match doc.templates.get(name) {
            Some(value) => Ok(TemplateRecord::from_value(value)),
            None => Err(InvoiceError::TemplateNotFound(name.to_string())),
        }
    }

    /// Template names in insertion order as stored.
    pub fn list(&self) -> Result<Vec<String>> {
        Ok(self.store.load()?.templates.keys().cloned().collect())
    }

    /// Names with decoded records, for display.
    pub fn entries(&self) -> Result<Vec<(String, TemplateRecord)>> {
        Ok(self
            .store
            .load()?
            .templates
            .iter()
            .map(|(name, value)| (name.clone(), TemplateRecord::from_value(value)))
            .collect())
    }
}
