//! Following a file by path across truncation and rotation.

use crate::decode::Decoder;
use crate::error::Result;
use crate::follow::Follower;
use crate::identity::{FileIdentity, has_rotated};
use crate::options::FollowOptions;
use crate::watcher::Pacer;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

type CancelFn = Box<dyn FnMut() -> bool + Send>;

/// The currently open generation of the followed file.
struct OpenFile {
    follower: Follower<File>,
    identity: FileIdentity,
}

/// Follows whatever file lives at a path, decoding lines to text.
///
/// When the path is replaced by a different file (log rotation) or removed,
/// the remaining lines of the old file are drained first, then the stale
/// handle is closed and the new file is read from its start as soon as it
/// appears. At most one handle is open at a time.
pub struct PathFollower {
    path: PathBuf,
    options: FollowOptions,
    decoder: Decoder,
    pacer: Pacer,
    current: Option<OpenFile>,
    // Only a file that did not exist when following began is joined at its end.
    from_end_on_open: bool,
    on_delay: Option<CancelFn>,
    finished: bool,
}

impl PathFollower {
    /// Starts following `path` from its current end.
    ///
    /// The path does not have to exist yet.
    pub fn new<P: AsRef<Path>>(path: P, options: FollowOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let pacer = if options.watch {
            Pacer::watching(&path, options.delay)?
        } else {
            Pacer::sleep(options.delay)
        };

        let mut follower = Self {
            decoder: options.decoder(),
            path,
            options,
            pacer,
            current: None,
            from_end_on_open: true,
            on_delay: None,
            finished: false,
        };

        if follower.path.is_file() {
            follower.current = Some(follower.open()?);
        }
        Ok(follower)
    }

    /// Installs a cancellation predicate, checked whenever no line is
    /// available before sleeping. Returning true ends the iteration.
    pub fn on_delay<F>(mut self, on_delay: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.on_delay = Some(Box::new(on_delay));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// One non-blocking step: the next line if one is ready, handling a
    /// rotation or a newly appeared file along the way.
    pub fn poll_line(&mut self) -> Result<Option<String>> {
        let raw = match self.poll_current()? {
            Some(raw) => Some(raw),
            None if self.current_is_stale() => {
                self.close_stale();
                if self.try_reopen() {
                    self.poll_current()?
                } else {
                    None
                }
            }
            None => None,
        };
        raw.map(|raw| self.decoder.decode(&raw)).transpose()
    }

    /// Blocks until the next line is available, or `on_delay` cancels.
    ///
    /// A line that cannot be decoded under the strict policy is returned as
    /// [`crate::Error::Decode`] and following continues with the next line. Any
    /// other error ends the iteration.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        if self.finished {
            return Ok(None);
        }

        match self.next_raw_line() {
            Ok(Some(raw)) => self.decoder.decode(&raw).map(Some),
            Ok(None) => {
                self.finished = true;
                Ok(None)
            }
            Err(e) => {
                self.finished = true;
                Err(e)
            }
        }
    }

    fn next_raw_line(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            if let Some(open) = self.current.as_mut() {
                let path = self.path.as_path();
                let identity = open.identity;
                let on_delay = &mut self.on_delay;
                let mut cancelled = false;
                // Rotation stops the inner follower, but cancellation wins over reopening.
                let mut stop = || {
                    let rotated = has_rotated(path, identity);
                    cancelled = on_delay.as_mut().is_some_and(|cancel| cancel());
                    rotated || cancelled
                };

                if let Some(raw) = open.follower.next_line_with(&mut stop, &self.pacer)? {
                    return Ok(Some(raw));
                }
                if cancelled {
                    return Ok(None);
                }
                self.close_stale();
            }

            if self.try_reopen() {
                continue;
            }
            if self.cancel_requested() {
                return Ok(None);
            }
            self.pacer.pause();
        }
    }

    fn poll_current(&mut self) -> Result<Option<Vec<u8>>> {
        match self.current.as_mut() {
            Some(open) => open.follower.poll_line(),
            None => Ok(None),
        }
    }

    fn current_is_stale(&self) -> bool {
        match &self.current {
            Some(open) => has_rotated(&self.path, open.identity),
            None => true,
        }
    }

    fn cancel_requested(&mut self) -> bool {
        self.on_delay.as_mut().is_some_and(|cancel| cancel())
    }

    fn close_stale(&mut self) {
        if self.current.take().is_some() {
            info!(path = %self.path.display(), "followed file was rotated or removed");
        }
    }

    /// Opens the path if a file is there. Failures are logged and retried later.
    fn try_reopen(&mut self) -> bool {
        if !self.path.is_file() {
            return false;
        }
        match self.open() {
            Ok(open) => {
                self.current = Some(open);
                true
            }
            Err(e) => {
                info!(path = %self.path.display(), error = %e, "Unable to tail file");
                false
            }
        }
    }

    fn open(&mut self) -> Result<OpenFile> {
        let file = File::open(&self.path)?;
        let identity = FileIdentity::from_metadata(&file.metadata()?);

        let follower = if self.from_end_on_open {
            Follower::new(file, self.options.delay)?
        } else {
            Follower::from_start(file, self.options.delay)
        };
        self.from_end_on_open = false;

        debug!(path = %self.path.display(), position = follower.position(), "opened followed file");
        Ok(OpenFile { follower, identity })
    }
}

impl Iterator for PathFollower {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

/// Follows the file at `path` from its end, surviving truncation and rotation.
pub fn follow_path<P: AsRef<Path>>(path: P, options: FollowOptions) -> Result<PathFollower> {
    PathFollower::new(path, options)
}

impl std::fmt::Debug for PathFollower {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathFollower")
            .field("path", &self.path)
            .field("open", &self.current.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}
