//! Shared JSON fixtures for cadence tests and benches.
//!
//! Fixture files live under the workspace `fixtures/` directory and are
//! listed by name in `fixtures/manifest.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    sequences: HashMap<String, SequenceEntry>,
    #[serde(default)]
    configs: HashMap<String, String>,
}

/// A sequence document, optionally paired with the settle time it should
/// reach under the default configuration.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SequenceEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        settles_at: Option<f64>,
    },
}

impl SequenceEntry {
    fn as_path(&self) -> &str {
        match self {
            SequenceEntry::Path(path) => path,
            SequenceEntry::Detailed { path, .. } => path,
        }
    }

    fn settles_at(&self) -> Option<f64> {
        match self {
            SequenceEntry::Path(_) => None,
            SequenceEntry::Detailed { settles_at, .. } => *settles_at,
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod sequences {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.sequences.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.sequences, "sequence", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.sequences, "sequence", name)?;
        super::load_json(entry.as_path())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.sequences, "sequence", name)?;
        Ok(resolve_path(entry.as_path()))
    }

    /// Expected settle time, when the manifest records one.
    pub fn settles_at(name: &str) -> Result<Option<f64>> {
        let entry = lookup(&MANIFEST.sequences, "sequence", name)?;
        Ok(entry.settles_at())
    }
}

pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.configs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        read_to_string(rel)
    }
}
