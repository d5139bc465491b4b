//! Registry of supported graph database backends and the selector over it

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Supported graph database backends, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GraphDatabaseType {
    #[serde(rename = "tbdb")]
    TitanBerkeleyDb,
    #[serde(rename = "tddb")]
    TitanDynamoDb,
    #[serde(rename = "tc")]
    TitanCassandra,
    #[serde(rename = "tce")]
    TitanCassandraEmbedded,
    #[serde(rename = "thb")]
    TitanHbase,
    #[serde(rename = "tp")]
    TitanPersistit,
    #[serde(rename = "orient")]
    OrientDb,
    #[serde(rename = "neo4j")]
    Neo4j,
    #[serde(rename = "sparksee")]
    Sparksee,
}

/// Short name to backend lookup table
pub const STRING_REP_MAP: [(&str, GraphDatabaseType); 9] = [
    ("tbdb", GraphDatabaseType::TitanBerkeleyDb),
    ("tddb", GraphDatabaseType::TitanDynamoDb),
    ("tc", GraphDatabaseType::TitanCassandra),
    ("tce", GraphDatabaseType::TitanCassandraEmbedded),
    ("thb", GraphDatabaseType::TitanHbase),
    ("tp", GraphDatabaseType::TitanPersistit),
    ("orient", GraphDatabaseType::OrientDb),
    ("neo4j", GraphDatabaseType::Neo4j),
    ("sparksee", GraphDatabaseType::Sparksee),
];

impl GraphDatabaseType {
    /// Canonical short name used in configuration files
    pub fn short_name(&self) -> &'static str {
        match self {
            GraphDatabaseType::TitanBerkeleyDb => "tbdb",
            GraphDatabaseType::TitanDynamoDb => "tddb",
            GraphDatabaseType::TitanCassandra => "tc",
            GraphDatabaseType::TitanCassandraEmbedded => "tce",
            GraphDatabaseType::TitanHbase => "thb",
            GraphDatabaseType::TitanPersistit => "tp",
            GraphDatabaseType::OrientDb => "orient",
            GraphDatabaseType::Neo4j => "neo4j",
            GraphDatabaseType::Sparksee => "sparksee",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GraphDatabaseType::TitanBerkeleyDb => "BerkeleyDB",
            GraphDatabaseType::TitanDynamoDb => "DynamoDB",
            GraphDatabaseType::TitanCassandra => "Cassandra",
            GraphDatabaseType::TitanCassandraEmbedded => "Embedded Cassandra",
            GraphDatabaseType::TitanHbase => "HBase",
            GraphDatabaseType::TitanPersistit => "Persistit",
            GraphDatabaseType::OrientDb => "OrientDB",
            GraphDatabaseType::Neo4j => "Neo4j",
            GraphDatabaseType::Sparksee => "Sparksee",
        }
    }

    /// Titan storage backend name, for Titan variants only
    pub fn titan_backend(&self) -> Option<&'static str> {
        match self {
            GraphDatabaseType::TitanBerkeleyDb => Some("berkeleyje"),
            GraphDatabaseType::TitanDynamoDb => {
                Some("com.amazon.titan.diskstorage.dynamodb.DynamoDBStoreManager")
            }
            GraphDatabaseType::TitanCassandra => Some("cassandrathrift"),
            GraphDatabaseType::TitanCassandraEmbedded => Some("embeddedcassandra"),
            GraphDatabaseType::TitanHbase => Some("hbase"),
            GraphDatabaseType::TitanPersistit => Some("persistit"),
            _ => None,
        }
    }
}

impl fmt::Display for GraphDatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for GraphDatabaseType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        STRING_REP_MAP
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, db)| *db)
            .ok_or_else(|| ConfigError::UnsupportedDatabase(s.to_string()))
    }
}

/// The validated set of databases for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSelection {
    databases: BTreeSet<GraphDatabaseType>,
    permute: bool,
    scenarios: i32,
}

impl DatabaseSelection {
    /// Validate requested names and compute the scenario count
    pub fn select<S: AsRef<str>>(names: &[S], permute: bool) -> Result<Self> {
        let mut databases = BTreeSet::new();
        for name in names {
            databases.insert(name.as_ref().parse::<GraphDatabaseType>()?);
        }
        let scenarios = if permute { factorial(databases.len())? } else { 1 };
        Ok(Self {
            databases,
            permute,
            scenarios,
        })
    }

    pub fn databases(&self) -> &BTreeSet<GraphDatabaseType> {
        &self.databases
    }

    pub fn scenarios(&self) -> i32 {
        self.scenarios
    }

    pub fn permute(&self) -> bool {
        self.permute
    }

    /// Every execution order of the selected databases
    ///
    /// Lexicographic by canonical rank; a single canonical ordering when not
    /// permuting.
    pub fn permutations(&self) -> Vec<Vec<GraphDatabaseType>> {
        let canonical: Vec<GraphDatabaseType> = self.databases.iter().copied().collect();
        if !self.permute {
            return vec![canonical];
        }
        let mut out = Vec::with_capacity(self.scenarios.max(0) as usize);
        let mut current = canonical;
        loop {
            out.push(current.clone());
            if !next_permutation(&mut current) {
                break;
            }
        }
        out
    }
}

/// n! as an i32, failing instead of wrapping
pub fn factorial(n: usize) -> Result<i32> {
    (2..=n).try_fold(1i32, |acc, k| {
        i32::try_from(k)
            .ok()
            .and_then(|k| acc.checked_mul(k))
            .ok_or(ConfigError::Overflow(n))
    })
}

fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    if items.len() < 2 {
        return false;
    }
    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = items.len() - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        for (name, db) in STRING_REP_MAP {
            assert_eq!(name.parse::<GraphDatabaseType>().unwrap(), db);
            assert_eq!(db.short_name(), name);
        }
    }

    #[test]
    fn test_serializes_as_short_name() {
        for (name, db) in STRING_REP_MAP {
            assert_eq!(serde_json::to_value(db).unwrap(), serde_json::json!(name));
            let back: GraphDatabaseType = serde_json::from_value(serde_json::json!(name)).unwrap();
            assert_eq!(back, db);
        }
    }

    #[test]
    fn test_titan_backends() {
        assert_eq!(GraphDatabaseType::TitanBerkeleyDb.titan_backend(), Some("berkeleyje"));
        assert_eq!(GraphDatabaseType::TitanCassandra.titan_backend(), Some("cassandrathrift"));
        assert_eq!(GraphDatabaseType::OrientDb.titan_backend(), None);
        assert_eq!(GraphDatabaseType::Sparksee.titan_backend(), None);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let err = "Orient".parse::<GraphDatabaseType>().unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedDatabase(ref n) if n == "Orient"));
    }

    #[test]
    fn test_selection_uses_canonical_order() {
        let sel =
            DatabaseSelection::select(&["sparksee", "orient", "tbdb", "orient"], false).unwrap();
        let order: Vec<_> = sel.databases().iter().copied().collect();
        assert_eq!(
            order,
            vec![
                GraphDatabaseType::TitanBerkeleyDb,
                GraphDatabaseType::OrientDb,
                GraphDatabaseType::Sparksee
            ]
        );
        assert_eq!(sel.scenarios(), 1);
    }

    #[test]
    fn test_unsupported_name_reported() {
        let err = DatabaseSelection::select(&["orient", "nosuchdb"], true).unwrap_err();
        assert_eq!(err.to_string(), "selected database nosuchdb not supported");
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0).unwrap(), 1);
        assert_eq!(factorial(3).unwrap(), 6);
        assert_eq!(factorial(12).unwrap(), 479_001_600);
        assert!(matches!(factorial(13), Err(ConfigError::Overflow(13))));
    }

    #[test]
    fn test_permutations_match_scenarios() {
        let sel = DatabaseSelection::select(&["orient", "neo4j", "tc"], true).unwrap();
        let perms = sel.permutations();
        assert_eq!(sel.scenarios(), 6);
        assert_eq!(perms.len(), 6);
        assert_eq!(
            perms[0],
            vec![
                GraphDatabaseType::TitanCassandra,
                GraphDatabaseType::OrientDb,
                GraphDatabaseType::Neo4j
            ]
        );
        let unique: BTreeSet<_> = perms.iter().cloned().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_no_permute_single_ordering() {
        let sel = DatabaseSelection::select(&["orient", "neo4j", "tc"], false).unwrap();
        assert_eq!(sel.permutations().len(), 1);
    }
}
