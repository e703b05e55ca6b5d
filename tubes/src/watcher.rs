//! # Shader Hot-Reloading
//!
//! Watches a shader directory with [`notify`] and forwards changed `.wgsl`
//! paths over a channel. The event loop drains the channel between frames,
//! so the renderer is only touched from its own thread.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{anyhow, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use tracing::{debug, error, info};

const SHADER_EXTENSION: &str = "wgsl";

/// A live watcher and the receiving end of its change channel. Dropping it
/// stops the watch.
pub struct ShaderWatcher {
    _watcher: RecommendedWatcher,
    changes: Receiver<PathBuf>,
}

impl ShaderWatcher {
    /// Start watching `dir` recursively.
    ///
    /// # Errors
    ///
    /// Fails when the directory does not exist or `notify` cannot watch it.
    pub fn start(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            return Err(anyhow!("shader directory '{}' not found", dir.display()));
        }

        let (tx, changes) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |result| handle_file_event(&tx, result))
            .map_err(|e| anyhow!("failed to create file watcher: {e}"))?;
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .map_err(|e| anyhow!("failed to watch shader directory: {e}"))?;

        info!(dir = %dir.display(), "shader watcher active");
        Ok(Self {
            _watcher: watcher,
            changes,
        })
    }

    /// Every shader changed since the last call, once each.
    #[must_use]
    pub fn drain(&self) -> Vec<PathBuf> {
        let unique: BTreeSet<PathBuf> = self.changes.try_iter().collect();
        unique.into_iter().collect()
    }
}

#[must_use]
pub fn is_shader_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SHADER_EXTENSION)
}

fn handle_file_event(tx: &Sender<PathBuf>, result: notify::Result<Event>) {
    match result {
        Ok(event) => forward_shader_changes(tx, &event),
        Err(e) => error!("file watcher error: {e:?}"),
    }
}

fn forward_shader_changes(tx: &Sender<PathBuf>, event: &Event) {
    if !event.kind.is_modify() && !event.kind.is_create() {
        return;
    }
    for path in event.paths.iter().filter(|p| is_shader_file(p)) {
        debug!(path = %path.display(), "shader changed");
        // The receiver is gone once the event loop has exited.
        let _ = tx.send(path.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind, ModifyKind, RemoveKind};

    #[test]
    fn only_wgsl_files_count() {
        assert!(is_shader_file(Path::new("shaders/blur.wgsl")));
        assert!(!is_shader_file(Path::new("shaders/blur.wgsl.swp")));
        assert!(!is_shader_file(Path::new("shaders")));
    }

    #[test]
    fn modifications_are_forwarded_and_removals_ignored() {
        let (tx, rx) = mpsc::channel();
        let modified = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("s/tube.wgsl"))
            .add_path(PathBuf::from("s/notes.txt"));
        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("s/impulse.wgsl"));
        let removed = Event::new(EventKind::Remove(RemoveKind::File)).add_path(PathBuf::from("s/blur.wgsl"));

        forward_shader_changes(&tx, &modified);
        forward_shader_changes(&tx, &created);
        forward_shader_changes(&tx, &removed);

        let paths: Vec<PathBuf> = rx.try_iter().collect();
        assert_eq!(paths, vec![PathBuf::from("s/tube.wgsl"), PathBuf::from("s/impulse.wgsl")]);
    }
}
