// src/store.rs
// Load-or-default / atomic-save for the small JSON documents the bot keeps
// on disk (watchlists, news ledger).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Read a JSON document; a missing or unreadable file yields the default.
/// Corruption loses history, it never takes the pipeline down.
pub fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    match fs::read_to_string(path) {
        Ok(s) => match serde_json::from_str(&s) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt state file, starting empty");
                T::default()
            }
        },
        Err(_) => T::default(),
    }
}

/// Whole-document replace: write a sibling temp file, then rename it over
/// the target, so a crash mid-write never leaves a half-written document.
pub fn save_atomic<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize,
{
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
    }
    let json = serde_json::to_vec_pretty(value).context("serializing state")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &json).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    type Doc = BTreeMap<String, Vec<String>>;

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let doc: Doc = load_or_default(&dir.path().join("absent.json"));
        assert!(doc.is_empty());
    }

    #[test]
    fn corrupt_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let doc: Doc = load_or_default(&path);
        assert!(doc.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let mut doc = Doc::new();
        doc.insert("BBCA".into(), vec!["https://a/1".into()]);
        save_atomic(&path, &doc).unwrap();
        let back: Doc = load_or_default(&path);
        assert_eq!(back, doc);
    }

    #[test]
    fn stale_temp_file_never_corrupts_a_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let mut doc = Doc::new();
        doc.insert("BBCA".into(), vec!["https://a/1".into()]);
        save_atomic(&path, &doc).unwrap();
        // A crash between write and rename leaves the temp sibling behind.
        fs::write(path.with_extension("json.tmp"), "garbage").unwrap();
        let back: Doc = load_or_default(&path);
        assert_eq!(back, doc);
    }
}
