//! Shared JSON fixtures for the matforge test suites.
//!
//! `fixtures/manifest.json` names every fixture; paths in it are relative to
//! the `fixtures/` directory at the workspace root.

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
    schemas: HashMap<String, String>,
    #[serde(default)]
    materials: HashMap<String, MaterialEntry>,
}

/// A material fixture, optionally tagged with the schema registry it was
/// authored against.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MaterialEntry {
    Bare(String),
    Tagged {
        path: String,
        #[serde(default)]
        schemas: Option<String>,
    },
}

impl MaterialEntry {
    fn rel(&self) -> &str {
        match self {
            MaterialEntry::Bare(path) | MaterialEntry::Tagged { path, .. } => path,
        }
    }
}

fn fixture_path(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel)
}

fn entry<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("no {kind} fixture named '{name}'"))
}

fn text(rel: &str) -> Result<String> {
    let path = fixture_path(rel);
    fs::read_to_string(&path).with_context(|| format!("reading fixture {}", path.display()))
}

fn parsed<T: DeserializeOwned>(rel: &str) -> Result<T> {
    serde_json::from_str(&text(rel)?).with_context(|| format!("parsing fixture {rel}"))
}

fn sorted_keys<T>(map: &HashMap<String, T>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

/// Node-schema registries in the JSON form read by `SchemaRegistry::from_json_str`.
pub mod schemas {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.schemas)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(fixture_path(entry(&MANIFEST.schemas, "schema", name)?))
    }

    pub fn json(name: &str) -> Result<String> {
        text(entry(&MANIFEST.schemas, "schema", name)?)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        parsed(entry(&MANIFEST.schemas, "schema", name)?)
    }
}

/// Material descriptions that integration tests build graphs from.
pub mod materials {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.materials)
    }

    pub fn json(name: &str) -> Result<String> {
        text(entry(&MANIFEST.materials, "material", name)?.rel())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        parsed(entry(&MANIFEST.materials, "material", name)?.rel())
    }

    /// Registry JSON the material was authored against.
    pub fn schema_json(name: &str) -> Result<String> {
        match entry(&MANIFEST.materials, "material", name)? {
            MaterialEntry::Tagged {
                schemas: Some(key), ..
            } => schemas::json(key),
            _ => Err(anyhow!("material fixture '{name}' names no schema registry")),
        }
    }
}
