//! Driver creation options
//!
//! Options are `KEY=VALUE` pairs handed to a driver when an image is created,
//! e.g. `COMPRESS=DEFLATE`. Keys are case-insensitive and stored upper-case.

use std::fmt;

use crate::errors::{RasterError, RasterResult};

/// Ordered set of creation options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationOptions {
    entries: Vec<(String, String)>,
}

impl CreationOptions {
    pub fn new() -> Self {
        CreationOptions { entries: Vec::new() }
    }

    /// Parses `KEY=VALUE` strings
    pub fn from_pairs(pairs: &[&str]) -> RasterResult<Self> {
        let mut options = CreationOptions::new();
        for pair in pairs {
            let (key, value) = pair.split_once('=')
                .ok_or_else(|| RasterError::Config(format!("Creation option '{}' is not KEY=VALUE", pair)))?;
            options.set(key.trim(), value.trim());
        }
        Ok(options)
    }

    /// Sets an option, replacing an earlier value for the same key
    pub fn set(&mut self, key: &str, value: &str) {
        let key = key.to_ascii_uppercase();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key, value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_uppercase();
        self.entries.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for CreationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive_and_replaced() {
        let mut options = CreationOptions::from_pairs(&["compress=deflate", "BIGTIFF=NO"]).unwrap();
        assert_eq!(options.get("COMPRESS"), Some("deflate"));
        options.set("Compress", "ZSTD");
        assert_eq!(options.get("compress"), Some("ZSTD"));
        assert_eq!(options.iter().count(), 2);
    }

    #[test]
    fn test_malformed_pairs_are_rejected() {
        assert!(matches!(CreationOptions::from_pairs(&["COMPRESS"]), Err(RasterError::Config(_))));
    }
}
