//! Pacing between follow polls: a plain sleep, or a sleep cut short by
//! filesystem events from the notify crate.

use crate::error::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// A simple file watcher that monitors a specific file for changes.
pub(crate) struct FileWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<notify::Result<Event>>,
    file_path: PathBuf,
    file_name: String,
}

impl FileWatcher {
    /// Starts watching the directory containing `path`, so the file may be
    /// missing, replaced or recreated.
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        let (tx, rx) = mpsc::channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(watch_dir(&file_path), RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            file_path,
            file_name,
        })
    }

    /// Blocks until an event for the watched file arrives or `timeout` passes.
    ///
    /// Returns true if woken by an event.
    pub(crate) fn wait_for_change(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(Ok(event)) if is_event_relevant_to_file(&event, &self.file_name) => {
                    // Coalesce the burst a single write usually produces.
                    while self.receiver.try_recv().is_ok() {}
                    return true;
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => debug!(path = %self.file_path.display(), error = %e, "watch error"),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(remaining);
                    return false;
                }
            }
        }
    }

    #[cfg(test)]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Directory to watch for `path`; a bare file name lives in the current directory.
fn watch_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Check if a notify event is relevant to a specific file
pub(crate) fn is_event_relevant_to_file(event: &Event, target_file_name: &str) -> bool {
    event.paths.iter().any(|path| {
        path.file_name()
            .map(|name| name.to_string_lossy() == target_file_name)
            .unwrap_or(false)
    })
}

/// How a follower waits when no complete line is available.
pub(crate) enum Pacer {
    Sleep(Duration),
    Watch { watcher: FileWatcher, delay: Duration },
}

impl Pacer {
    pub(crate) fn sleep(delay: Duration) -> Self {
        Pacer::Sleep(delay)
    }

    /// Waits at most `delay`, waking early on events for `path`.
    pub(crate) fn watching(path: &Path, delay: Duration) -> Result<Self> {
        Ok(Pacer::Watch {
            watcher: FileWatcher::new(path)?,
            delay,
        })
    }

    pub(crate) fn pause(&self) {
        match self {
            Pacer::Sleep(delay) => thread::sleep(*delay),
            Pacer::Watch { watcher, delay } => {
                watcher.wait_for_change(*delay);
            }
        }
    }
}
