use anyhow::{anyhow, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver},
};

/// Watches a palette directory for `.toml` edits.
pub struct PaletteWatcher {
    _watcher: RecommendedWatcher,
    changes_rx: Receiver<notify::Result<notify::Event>>,
}

impl PaletteWatcher {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            return Err(anyhow!(
                "Palette directory {} does not exist",
                root.display()
            ));
        }

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&root, RecursiveMode::NonRecursive)?;
        log::info!("Watching palettes in {}", root.display());

        Ok(Self {
            _watcher: watcher,
            changes_rx: rx,
        })
    }

    /// Drains pending events; true when any palette file changed.
    pub fn poll(&self) -> bool {
        let mut relevant = false;
        while let Ok(event) = self.changes_rx.try_recv() {
            match event {
                Ok(evt) => relevant |= touches_palette(&evt.paths),
                Err(err) => log::warn!("Palette watcher error: {err}"),
            }
        }
        relevant
    }
}

fn touches_palette(paths: &[PathBuf]) -> bool {
    paths.iter().any(|p| {
        p.extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_toml_paths_are_relevant() {
        assert!(touches_palette(&[PathBuf::from("themes/dark.TOML")]));
        assert!(!touches_palette(&[PathBuf::from("themes/notes.txt")]));
        assert!(!touches_palette(&[]));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PaletteWatcher::new(dir.path().join("absent")).is_err());
    }
}
