// src/news/sources.rs
// The news source registry: which domains we trust, in which priority
// order, and which path prefixes count as content pages there.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NewsSource {
    pub label: String,
    pub domain: String,
    #[serde(default = "default_prefixes")]
    pub path_prefixes: Vec<String>,
}

fn default_prefixes() -> Vec<String> {
    vec!["/".to_string()]
}

impl NewsSource {
    pub fn new(label: &str, domain: &str, prefixes: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            domain: domain.to_ascii_lowercase(),
            path_prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Accept iff the URL's host contains the declared domain and the path
    /// starts with one of the declared prefixes. The feed search is keyword
    /// based, so this is the primary noise filter.
    pub fn url_matches(&self, link: &str) -> bool {
        let Ok(parsed) = Url::parse(link) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        if !host.to_ascii_lowercase().contains(&self.domain) {
            return false;
        }
        let path = parsed.path();
        self.path_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<NewsSource>,
}

impl SourceRegistry {
    /// Built-in IDX-centric set, in delivery priority order.
    pub fn default_seed() -> Self {
        Self {
            sources: vec![
                NewsSource::new("IDX", "idx.co.id", &["/"]),
                NewsSource::new("InvestorID", "investor.id", &["/"]),
                NewsSource::new("CNBC", "cnbcindonesia.com", &["/market", "/news", "/research"]),
                NewsSource::new("RTI", "rti.co.id", &["/"]),
            ],
        }
    }

    /// Optional TOML override; any problem falls back to the built-in set
    /// so a bad config file cannot silence the news pipeline.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default_seed();
        };
        match Self::from_toml_file(path) {
            Ok(registry) if !registry.is_empty() => registry,
            Ok(_) => {
                tracing::warn!(path = %path.display(), "sources file lists no sources, using built-in set");
                Self::default_seed()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = ?e, "failed to load sources file, using built-in set");
                Self::default_seed()
            }
        }
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading sources from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Doc {
            #[serde(default)]
            sources: Vec<NewsSource>,
        }

        let doc: Doc = toml::from_str(content).context("parsing sources toml")?;
        let sources = doc
            .sources
            .into_iter()
            .map(|mut src| {
                src.domain = src.domain.trim().to_ascii_lowercase();
                if src.path_prefixes.is_empty() {
                    src.path_prefixes = default_prefixes();
                }
                src
            })
            .filter(|src| !src.domain.is_empty())
            .collect();
        Ok(Self { sources })
    }

    pub fn from_sources(sources: Vec<NewsSource>) -> Self {
        Self { sources }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NewsSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
