use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub mod gate;
pub mod host;
pub mod logging;

pub use gate::{poll_once, Gate};
pub use host::{url, FakeHost, HistoryOp, NodeId, Op, ORIGIN};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    pages: HashMap<String, String>,
}

/// A server-rendered page as stored in `fixtures/pages`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageFixture {
    #[serde(default)]
    pub title: Option<String>,
    pub body: FixtureNode,
}

/// One element of a page fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<FixtureNode>,
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

pub mod pages {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.pages.keys().cloned().collect()
    }

    /// Raw document text, as a server would send it.
    pub fn body(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.pages, "page", name)?;
        read_to_string(rel)
    }

    pub fn load(name: &str) -> Result<PageFixture> {
        let rel = lookup(&MANIFEST.pages, "page", name)?;
        load_json(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_page_loads() {
        let keys = pages::keys();
        assert!(keys.len() >= 5);
        for key in keys {
            let page = pages::load(&key).unwrap_or_else(|e| panic!("{key}: {e:#}"));
            assert_eq!(page.body.tag, "body", "{key}");
        }
    }

    #[test]
    fn unknown_page_is_an_error() {
        let err = pages::load("missing").unwrap_err();
        assert!(err.to_string().contains("unknown page fixture 'missing'"));
    }
}
