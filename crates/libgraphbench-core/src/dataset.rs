//! Dataset locator and edge-list reader
//!
//! A dataset is referenced by path. Datasets too large for a single file may
//! be stored as two parts, `<path>.1` and `<path>.2`, which are read back as
//! one stream. Validation only checks that the files are readable; handles
//! are opened fresh on every [`DatasetSource::open`] call so a run can make
//! several independent passes over the same data.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// A validated, re-openable byte source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Single(PathBuf),
    Split {
        path: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
}

impl DatasetSource {
    /// Open a fresh reader over the whole dataset
    pub fn open(&self) -> Result<Box<dyn Read + Send>> {
        match self {
            DatasetSource::Single(path) => Ok(Box::new(open_file(path)?)),
            DatasetSource::Split { first, second, .. } => {
                let head = open_file(first)?;
                let tail = open_file(second)?;
                Ok(Box::new(head.chain(tail)))
            }
        }
    }

    /// Open a buffered edge-list reader over the dataset
    pub fn edges(&self) -> Result<EdgeListReader<BufReader<Box<dyn Read + Send>>>> {
        Ok(EdgeListReader::new(BufReader::new(self.open()?)))
    }

    /// The configured path (without part suffixes)
    pub fn path(&self) -> &Path {
        match self {
            DatasetSource::Single(path) => path,
            DatasetSource::Split { path, .. } => path,
        }
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| ConfigError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

fn part_path(path: &Path, part: u8) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", part));
    PathBuf::from(name)
}

/// Resolve a configured path into a re-openable source
///
/// `field` names the configuration key in error messages.
pub fn validate_readable_file_stream(path: impl AsRef<Path>, field: &str) -> Result<DatasetSource> {
    let path = path.as_ref();
    if !path.exists() {
        let first = part_path(path, 1);
        let second = part_path(path, 2);
        if is_readable_file(&first) && is_readable_file(&second) {
            tracing::debug!(
                "{} {} is split into {} and {}",
                field,
                path.display(),
                first.display(),
                second.display()
            );
            return Ok(DatasetSource::Split {
                path: path.to_path_buf(),
                first,
                second,
            });
        }
        return Err(ConfigError::Path(format!("the {} does not exist", field)));
    }

    if !is_readable_file(path) {
        return Err(ConfigError::Path(format!(
            "the {} must be a file that this user can read",
            field
        )));
    }

    Ok(DatasetSource::Single(path.to_path_buf()))
}

/// One edge from an edge-list dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub line: usize,
}

/// Streams `source target` pairs from a whitespace separated edge list
///
/// Blank lines and lines starting with `#` are skipped.
pub struct EdgeListReader<R> {
    inner: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> EdgeListReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for EdgeListReader<R> {
    type Item = Result<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.inner.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(ConfigError::Io(e))),
            }
            self.line += 1;

            let trimmed = self.buf.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut tokens = trimmed.split_whitespace();
            return Some(match (tokens.next(), tokens.next()) {
                (Some(source), Some(target)) => Ok(Edge {
                    source: source.to_string(),
                    target: target.to_string(),
                    line: self.line,
                }),
                _ => Err(ConfigError::Dataset {
                    line: self.line,
                    reason: format!("expected 'source target', got '{}'", trimmed),
                }),
            });
        }
    }
}
