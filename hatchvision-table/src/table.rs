//! Keyed value store shared between the vision process and the robot

use crate::value::TableValue;
use dashmap::DashMap;
use std::collections::BTreeMap;
use tracing::trace;

/// One named table of the shared store
#[derive(Debug)]
pub struct SharedTable {
    path: String,
    entries: DashMap<String, TableValue>,
}

impl SharedTable {
    /// Create an empty table
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entries: DashMap::new(),
        }
    }

    /// Get the table path, e.g. `SmartDashboard/Vision`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn put(&self, key: &str, value: impl Into<TableValue>) {
        let value = value.into();
        trace!("{}/{} = {}", self.path, key, value);
        self.entries.insert(key.to_string(), value);
    }

    pub fn put_number(&self, key: &str, value: f64) {
        self.put(key, value);
    }

    pub fn put_string(&self, key: &str, value: impl Into<String>) {
        self.put(key, TableValue::String(value.into()));
    }

    pub fn put_boolean(&self, key: &str, value: bool) {
        self.put(key, value);
    }

    pub fn get(&self, key: &str) -> Option<TableValue> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Numeric value of `key`, or `default` when missing or not numeric
    pub fn get_number(&self, key: &str, default: f64) -> f64 {
        self.entries
            .get(key)
            .and_then(|entry| entry.value().as_number())
            .unwrap_or(default)
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .and_then(|entry| entry.value().as_str().map(str::to_string))
    }

    pub fn remove(&self, key: &str) -> Option<TableValue> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    /// Sorted copy of every entry
    pub fn snapshot(&self) -> BTreeMap<String, TableValue> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get_number() {
        let table = SharedTable::new("Shuffleboard/LiveWindow");
        table.put_number("Offset", 1.4375);
        assert_eq!(table.get_number("Offset", 0.0), 1.4375);
        assert_eq!(table.get("Offset"), Some(TableValue::Number(1.4375)));
    }

    #[test]
    fn test_get_number_default() {
        let table = SharedTable::new("SmartDashboard/Vision");
        assert_eq!(table.get_number("isTeleop", 1.0), 1.0);

        table.put_string("isTeleop", "yes");
        // strings are not numeric
        assert_eq!(table.get_number("isTeleop", 1.0), 1.0);

        table.put_boolean("isTeleop", false);
        assert_eq!(table.get_number("isTeleop", 1.0), 0.0);
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let table = SharedTable::new("t");
        table.put_number("Offset", 1.0);
        table.put_number("Offset", -2.0);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_number("Offset", 0.0), -2.0);
    }

    #[test]
    fn test_snapshot_sorted() {
        let table = SharedTable::new("t");
        table.put_string("Direction", "left");
        table.put_number("Distance", 2.0);
        let keys: Vec<String> = table.snapshot().into_keys().collect();
        assert_eq!(keys, vec!["Direction".to_string(), "Distance".to_string()]);
    }

    #[test]
    fn test_remove() {
        let table = SharedTable::new("t");
        table.put_number("Offset", 3.0);
        assert_eq!(table.remove("Offset"), Some(TableValue::Number(3.0)));
        assert!(table.is_empty());
        assert_eq!(table.get_string("Offset"), None);
    }
}
