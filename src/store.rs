use std::collections::HashMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AuditError, Result};
use crate::models::{AppData, AppSettings, ExpenseEntry, IncomeEntry};

pub const SETTINGS_KEY: &str = "auditthis-settings";
pub const INCOME_KEY: &str = "auditthis-income";
pub const EXPENSES_KEY: &str = "auditthis-expenses";
pub const COMPANIES_KEY: &str = "auditthis-companies";
pub const ACTIVE_COMPANY_KEY: &str = "auditthis-active-company";

/// Format stamp written next to every document. Bump together with a
/// migration arm in `open` when a stored shape changes incompatibly;
/// additive fields are handled by merge-on-read and need no bump.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    schema_version INTEGER NOT NULL DEFAULT 1,
    updated_at TEXT DEFAULT (datetime('now'))
);
";

/// Synchronous key-value adapter over sqlite. Documents are JSON, keyed by
/// a base name plus an optional company namespace. Writes go to an
/// in-memory mirror first, so the current session keeps functioning even
/// when the disk write fails; reads fall back to supplied defaults instead
/// of surfacing storage errors.
pub struct Store {
    conn: Connection,
    mirror: HashMap<String, String>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Store> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store {
            conn,
            mirror: HashMap::new(),
        })
    }

    pub fn in_memory() -> Result<Store> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store {
            conn,
            mirror: HashMap::new(),
        })
    }

    pub fn effective_key(base: &str, company_id: Option<&str>) -> String {
        match company_id {
            Some(id) => format!("{base}-{id}"),
            None => base.to_string(),
        }
    }

    fn fetch_db(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn fetch(&self, key: &str) -> Result<Option<String>> {
        if let Some(raw) = self.mirror.get(key) {
            return Ok(Some(raw.clone()));
        }
        self.fetch_db(key)
    }

    /// Read a document, falling back to `default` when it is missing or
    /// unreadable. When the default is a plain JSON object, stored fields
    /// are shallow-merged over it so documents written by older versions
    /// pick up newly added fields.
    pub fn read<T>(&self, base: &str, company_id: Option<&str>, default: T) -> T
    where
        T: DeserializeOwned + Serialize,
    {
        let key = Self::effective_key(base, company_id);
        let raw = match self.fetch(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                eprintln!("warning: failed to read \"{key}\": {e}");
                return default;
            }
        };
        merge_with_default(&raw, default, &key)
    }

    /// Fallible read used where corruption must be detected rather than
    /// masked (registry bootstrap).
    pub fn try_read<T: DeserializeOwned>(
        &self,
        base: &str,
        company_id: Option<&str>,
    ) -> Result<Option<T>> {
        let key = Self::effective_key(base, company_id);
        match self.fetch_db(&key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AuditError::Other(format!("corrupt document \"{key}\": {e}"))),
            None => Ok(None),
        }
    }

    pub fn write<T: Serialize>(&mut self, base: &str, company_id: Option<&str>, value: &T) {
        let key = Self::effective_key(base, company_id);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("warning: failed to serialize \"{key}\": {e}");
                return;
            }
        };
        self.put_raw(&key, raw);
    }

    /// The active-company pointer is a bare string, not a JSON document.
    pub fn read_string(&self, base: &str) -> Option<String> {
        match self.fetch(base) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("warning: failed to read \"{base}\": {e}");
                None
            }
        }
    }

    pub fn write_string(&mut self, base: &str, value: &str) {
        self.put_raw(base, value.to_string());
    }

    fn put_raw(&mut self, key: &str, raw: String) {
        // Mirror first: a failed disk write must not lose the value for
        // the rest of this session.
        self.mirror.insert(key.to_string(), raw.clone());
        let result = self.conn.execute(
            "INSERT INTO kv (key, value, schema_version) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, schema_version = ?3,
             updated_at = datetime('now')",
            rusqlite::params![key, raw, SCHEMA_VERSION],
        );
        if let Err(e) = result {
            eprintln!("warning: failed to persist \"{key}\": {e}");
        }
    }

    pub fn remove(&mut self, base: &str, company_id: Option<&str>) {
        let key = Self::effective_key(base, company_id);
        self.mirror.remove(&key);
        if let Err(e) = self.conn.execute("DELETE FROM kv WHERE key = ?1", [&key]) {
            eprintln!("warning: failed to remove \"{key}\": {e}");
        }
    }

    /// Wipe every stored document. Only used by the bootstrap corruption
    /// fallback.
    pub fn clear(&mut self) {
        self.mirror.clear();
        if let Err(e) = self.conn.execute("DELETE FROM kv", []) {
            eprintln!("warning: failed to clear store: {e}");
        }
    }

    // -----------------------------------------------------------------------
    // Typed accessors. Every call names the company explicitly.
    // -----------------------------------------------------------------------

    pub fn load_app_data(&self, company_id: &str) -> AppData {
        AppData {
            settings: self.read(SETTINGS_KEY, Some(company_id), AppSettings::default()),
            income: self.read(INCOME_KEY, Some(company_id), Vec::new()),
            expenses: self.read(EXPENSES_KEY, Some(company_id), Vec::new()),
        }
    }

    pub fn save_settings(&mut self, company_id: &str, settings: &AppSettings) {
        self.write(SETTINGS_KEY, Some(company_id), settings);
    }

    pub fn save_income(&mut self, company_id: &str, income: &[IncomeEntry]) {
        self.write(INCOME_KEY, Some(company_id), &income);
    }

    pub fn save_expenses(&mut self, company_id: &str, expenses: &[ExpenseEntry]) {
        self.write(EXPENSES_KEY, Some(company_id), &expenses);
    }

    pub fn save_app_data(&mut self, company_id: &str, data: &AppData) {
        self.save_settings(company_id, &data.settings);
        self.save_income(company_id, &data.income);
        self.save_expenses(company_id, &data.expenses);
    }
}

fn merge_with_default<T>(raw: &str, default: T, key: &str) -> T
where
    T: DeserializeOwned + Serialize,
{
    let stored: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("warning: corrupt document \"{key}\": {e}");
            return default;
        }
    };
    let base = match serde_json::to_value(&default) {
        Ok(v) => v,
        Err(_) => return default,
    };
    let merged = match (base, stored) {
        // Stored fields win per key; keys absent from storage keep the
        // default, which is how schema additions reach existing data.
        (Value::Object(mut base), Value::Object(over)) => {
            for (k, v) in over {
                base.insert(k, v);
            }
            Value::Object(base)
        }
        (_, stored) => stored,
    };
    match serde_json::from_value(merged) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("warning: unusable document \"{key}\": {e}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppSettings;
    use serde::Deserialize;

    #[test]
    fn test_read_missing_returns_default() {
        let store = Store::in_memory().unwrap();
        let settings = store.read(SETTINGS_KEY, Some("co-1"), AppSettings::default());
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let mut store = Store::in_memory().unwrap();
        let mut settings = AppSettings::default();
        settings.currency = "€".to_string();
        store.write(SETTINGS_KEY, Some("co-1"), &settings);
        let loaded = store.read(SETTINGS_KEY, Some("co-1"), AppSettings::default());
        assert_eq!(loaded.currency, "€");
    }

    #[test]
    fn test_company_namespaces_are_isolated() {
        let mut store = Store::in_memory().unwrap();
        let mut a = AppSettings::default();
        a.currency = "A".to_string();
        let mut b = AppSettings::default();
        b.currency = "B".to_string();
        store.write(SETTINGS_KEY, Some("co-a"), &a);
        store.write(SETTINGS_KEY, Some("co-b"), &b);
        assert_eq!(store.read(SETTINGS_KEY, Some("co-a"), AppSettings::default()).currency, "A");
        assert_eq!(store.read(SETTINGS_KEY, Some("co-b"), AppSettings::default()).currency, "B");
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Widened {
        color: String,
        #[serde(default = "default_size")]
        size: u32,
    }

    fn default_size() -> u32 {
        7
    }

    #[test]
    fn test_merge_on_read_backfills_new_field() {
        let mut store = Store::in_memory().unwrap();
        // Simulate a document written before `size` existed.
        store.write_string("widget", r#"{"color":"red"}"#);
        let loaded = store.read(
            "widget",
            None,
            Widened { color: "blue".to_string(), size: default_size() },
        );
        assert_eq!(loaded.color, "red", "stored field wins");
        assert_eq!(loaded.size, 7, "missing field comes from the default");
    }

    #[test]
    fn test_arrays_are_not_merged() {
        let mut store = Store::in_memory().unwrap();
        store.write("list", None, &vec![1, 2, 3]);
        let loaded: Vec<i32> = store.read("list", None, vec![9, 9, 9, 9]);
        assert_eq!(loaded, vec![1, 2, 3]);
    }

    #[test]
    fn test_corrupt_document_falls_back_to_default() {
        let mut store = Store::in_memory().unwrap();
        store.write_string(Store::effective_key(SETTINGS_KEY, Some("co-1")).as_str(), "{not json");
        let settings = store.read(SETTINGS_KEY, Some("co-1"), AppSettings::default());
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_try_read_surfaces_corruption() {
        let mut store = Store::in_memory().unwrap();
        store.write_string(COMPANIES_KEY, "{not json");
        let result: Result<Option<Vec<crate::models::Company>>> =
            store.try_read(COMPANIES_KEY, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_string_pointer() {
        let mut store = Store::in_memory().unwrap();
        assert!(store.read_string(ACTIVE_COMPANY_KEY).is_none());
        store.write_string(ACTIVE_COMPANY_KEY, "demo-company");
        assert_eq!(store.read_string(ACTIVE_COMPANY_KEY).as_deref(), Some("demo-company"));
    }

    #[test]
    fn test_remove_deletes_namespaced_document() {
        let mut store = Store::in_memory().unwrap();
        store.write(INCOME_KEY, Some("co-1"), &vec![1, 2]);
        store.remove(INCOME_KEY, Some("co-1"));
        let loaded: Vec<i32> = store.read(INCOME_KEY, Some("co-1"), Vec::new());
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_clear_wipes_everything() {
        let mut store = Store::in_memory().unwrap();
        store.write_string(ACTIVE_COMPANY_KEY, "x");
        store.write(INCOME_KEY, Some("co-1"), &vec![1]);
        store.clear();
        assert!(store.read_string(ACTIVE_COMPANY_KEY).is_none());
        let loaded: Vec<i32> = store.read(INCOME_KEY, Some("co-1"), Vec::new());
        assert!(loaded.is_empty());
    }
}
