//! Durable set of links that have already been announced.
//!
//! Stored as a single JSON array of strings. Loading is forgiving: a missing
//! or unreadable file starts a fresh set. Saving is not: losing the set means
//! every listing gets announced again next run, so write errors propagate.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> HashSet<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no seen-store yet, starting empty");
                return HashSet::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "seen-store unreadable, starting empty");
                return HashSet::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(links) => {
                let seen: HashSet<String> = links.into_iter().collect();
                tracing::debug!(count = seen.len(), "seen-store loaded");
                seen
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "seen-store corrupt, starting empty");
                HashSet::new()
            }
        }
    }

    /// Replace the stored set with `seen`.
    pub fn save(&self, seen: &HashSet<String>) -> Result<()> {
        let mut links: Vec<&String> = seen.iter().collect();
        links.sort();
        let json = serde_json::to_string_pretty(&links).context("failed to serialize seen links")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory: {}", parent.display()))?;
        }

        // Write beside the target then rename so a crash never truncates the store
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)
            .with_context(|| format!("Failed to write seen-store: {}", tmp.display()))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e)
                .with_context(|| format!("Failed to replace seen-store: {}", self.path.display()));
        }

        tracing::debug!(count = seen.len(), path = %self.path.display(), "seen-store saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "seen".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
