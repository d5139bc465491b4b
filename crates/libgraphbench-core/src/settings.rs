//! Hierarchical key/value configuration source
//!
//! Settings are a tree of namespaces addressed with dotted keys
//! (`eu.socialsensor.metrics.csv.directory`). They load either from TOML or
//! from a Java-style `.properties` file, where every value is a string and
//! the typed getters convert on read.

use std::path::Path;

use toml::{Table, Value};

use crate::error::{ConfigError, Result};

/// A hierarchical configuration tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    root: Table,
}

impl Settings {
    pub fn from_table(root: Table) -> Self {
        Self { root }
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let root: Table = toml::from_str(content)?;
        Ok(Self { root })
    }

    /// Parse a `.properties` document
    ///
    /// Dotted keys become nested namespaces. Comma separated values and
    /// repeated keys become lists.
    pub fn from_properties_str(content: &str) -> Result<Self> {
        let mut root = Table::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let split_at = line.find(['=', ':']).ok_or_else(|| ConfigError::Parse {
                line: idx + 1,
                reason: format!("expected key=value, got '{}'", line),
            })?;
            let key = line[..split_at].trim();
            let value = line[split_at + 1..].trim();
            if key.is_empty() {
                return Err(ConfigError::Parse {
                    line: idx + 1,
                    reason: "empty key".to_string(),
                });
            }
            insert_property(&mut root, key, parse_property_value(value))?;
        }
        Ok(Self { root })
    }

    /// Load settings from a file, choosing the format by extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_properties_str(&content),
        }
    }

    /// The namespace under a dotted prefix (empty if absent)
    pub fn subset(&self, prefix: &str) -> Settings {
        match self.lookup(prefix) {
            Some(Value::Table(table)) => Settings::from_table(table.clone()),
            _ => Settings::default(),
        }
    }

    /// Whether a leaf value exists at the key
    pub fn contains_key(&self, key: &str) -> bool {
        matches!(self.lookup(key), Some(v) if !v.is_table())
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.leaf(key)? {
            None => Ok(None),
            Some(value) => scalar_to_string(key, value).map(Some),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.leaf(key)? {
            None => Ok(None),
            Some(Value::Boolean(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" => Ok(Some(true)),
                "false" | "no" | "off" => Ok(Some(false)),
                other => Err(ConfigError::invalid(key, format!("'{}' is not a boolean", other))),
            },
            Some(other) => Err(ConfigError::invalid(
                key,
                format!("expected a boolean, got {}", other.type_str()),
            )),
        }
    }

    pub fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.leaf(key)? {
            None => Ok(None),
            Some(value) => value_to_i64(key, value).map(Some),
        }
    }

    pub fn get_i32(&self, key: &str) -> Result<Option<i32>> {
        match self.get_i64(key)? {
            None => Ok(None),
            Some(n) => i32::try_from(n)
                .map(Some)
                .map_err(|_| ConfigError::invalid(key, format!("{} is out of range", n))),
        }
    }

    pub fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.leaf(key)? {
            None => Ok(None),
            Some(Value::Float(f)) => Ok(Some(*f)),
            Some(Value::Integer(i)) => Ok(Some(*i as f64)),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|e| ConfigError::invalid(key, format!("'{}': {}", s, e))),
            Some(other) => Err(ConfigError::invalid(
                key,
                format!("expected a number, got {}", other.type_str()),
            )),
        }
    }

    /// Read a list; a single scalar is a list of one (comma separated strings split)
    pub fn get_list(&self, key: &str) -> Result<Vec<String>> {
        match self.leaf(key)? {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items.iter().map(|v| scalar_to_string(key, v)).collect(),
            Some(Value::String(s)) => Ok(split_list(s)),
            Some(value) => Ok(vec![scalar_to_string(key, value)?]),
        }
    }

    fn leaf(&self, key: &str) -> Result<Option<&Value>> {
        match self.lookup(key) {
            Some(Value::Table(_)) => Err(ConfigError::invalid(
                key,
                "is a namespace, not a value",
            )),
            other => Ok(other),
        }
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = self.root.get(first)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }
}

fn parse_property_value(value: &str) -> Value {
    if value.contains(',') {
        Value::Array(split_list(value).into_iter().map(Value::String).collect())
    } else {
        Value::String(value.to_string())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn insert_property(root: &mut Table, key: &str, value: Value) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let (leaf, namespaces) = parts
        .split_last()
        .ok_or_else(|| ConfigError::invalid(key, "empty key"))?;

    let mut table = root;
    for ns in namespaces {
        let entry = table
            .entry(ns.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        table = match entry {
            Value::Table(t) => t,
            _ => {
                return Err(ConfigError::invalid(
                    key,
                    format!("'{}' is both a value and a namespace", ns),
                ))
            }
        };
    }

    match table.get_mut(*leaf) {
        None => {
            table.insert(leaf.to_string(), value);
        }
        Some(Value::Table(_)) => {
            return Err(ConfigError::invalid(key, "is both a value and a namespace"));
        }
        Some(Value::Array(existing)) => match value {
            Value::Array(more) => existing.extend(more),
            single => existing.push(single),
        },
        Some(existing) => {
            let mut merged = vec![existing.clone()];
            match value {
                Value::Array(more) => merged.extend(more),
                single => merged.push(single),
            }
            *existing = Value::Array(merged);
        }
    }
    Ok(())
}

fn scalar_to_string(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        other => Err(ConfigError::invalid(
            key,
            format!("expected a single value, got {}", other.type_str()),
        )),
    }
}

fn value_to_i64(key: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Integer(i) => Ok(*i),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::invalid(key, format!("'{}': {}", s, e))),
        other => Err(ConfigError::invalid(
            key,
            format!("expected an integer, got {}", other.type_str()),
        )),
    }
}
