//! The follow engine: a polling loop that yields lines as they are appended.

use crate::error::Result;
use crate::options::DEFAULT_READ_SIZE;
use crate::reader::{ChunkReader, detect_truncation};
use crate::scanner::seek_next_line;
use crate::terminator::{LineTerminator, strip_trailing_terminator, suffix_terminator};
use crate::watcher::Pacer;
use std::io::{Read, Seek};
use std::time::Duration;
use tracing::debug;

type CancelFn = Box<dyn FnMut() -> bool + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowState {
    /// Nothing emitted since the last end of stream; a lone terminator here
    /// belongs to the line about to be written and is dropped.
    Trailing,
    Active,
}

/// Yields complete lines appended to a stream, blocking between polls.
///
/// Lines are returned without their terminator. A partial line at the end of
/// the stream is held back until its terminator arrives. If the stream
/// shrinks below the cursor it is treated as truncated and read again from
/// the start.
///
/// Iteration ends only when the `on_delay` predicate returns true, or on an
/// I/O error; it cannot be restarted afterwards.
pub struct Follower<R> {
    reader: ChunkReader<R>,
    read_size: usize,
    cursor: u64,
    state: FollowState,
    // The last line ended in a `\r` at the end of the stream; a `\n` written
    // next completes that terminator.
    pending_cr: bool,
    delay: Duration,
    on_delay: Option<CancelFn>,
    finished: bool,
}

impl<R: Read + Seek> Follower<R> {
    /// Follows `stream` from its current end.
    pub fn new(stream: R, delay: Duration) -> Result<Self> {
        let mut reader = ChunkReader::new(stream);
        let cursor = reader.seek_end()?;
        Ok(Self::from_reader(reader, DEFAULT_READ_SIZE, cursor, delay))
    }

    /// Follows `stream` from its first byte.
    pub fn from_start(stream: R, delay: Duration) -> Self {
        Self::from_reader(ChunkReader::new(stream), DEFAULT_READ_SIZE, 0, delay)
    }

    pub(crate) fn from_reader(reader: ChunkReader<R>, read_size: usize, cursor: u64, delay: Duration) -> Self {
        Self {
            reader,
            read_size,
            cursor,
            state: FollowState::Trailing,
            pending_cr: false,
            delay,
            on_delay: None,
            finished: false,
        }
    }

    /// Installs a cancellation predicate, checked once each time no complete
    /// line is available, before sleeping.
    pub fn on_delay<F>(mut self, on_delay: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.on_delay = Some(Box::new(on_delay));
        self
    }

    /// Stream position where the next read starts.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// One non-blocking poll: the next complete line, or `None` if there is none yet.
    pub fn poll_line(&mut self) -> Result<Option<Vec<u8>>> {
        loop {
            let size = self.reader.size()?;
            if detect_truncation(size, self.cursor) {
                debug!(position = self.cursor, size, "stream truncated, reading from start");
                self.cursor = 0;
                self.state = FollowState::Trailing;
                self.pending_cr = false;
            }

            self.reader.seek(self.cursor)?;
            if self.pending_cr {
                match self.reader.read_byte()? {
                    None => {
                        self.state = FollowState::Trailing;
                        return Ok(None);
                    }
                    Some(b'\n') => {
                        self.cursor += 1;
                        self.pending_cr = false;
                        continue;
                    }
                    Some(_) => {
                        self.pending_cr = false;
                        self.reader.seek(self.cursor)?;
                    }
                }
            }

            let Some(end) = seek_next_line(&mut self.reader, self.read_size)? else {
                // Undo the partial read so the line is picked up whole later.
                self.reader.seek(self.cursor)?;
                self.state = FollowState::Trailing;
                return Ok(None);
            };

            self.reader.seek(self.cursor)?;
            let (_, raw) = self.reader.read((end - self.cursor) as usize)?;
            self.cursor = end;
            self.pending_cr = end >= size && suffix_terminator(&raw) == Some(LineTerminator::Cr);

            let was_trailing = self.state == FollowState::Trailing;
            self.state = FollowState::Active;

            let line = strip_trailing_terminator(&raw);
            if was_trailing && line.is_empty() {
                continue;
            }
            return Ok(Some(line.to_vec()));
        }
    }

    /// Blocks until a complete line is available or `on_delay` cancels.
    pub fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        if self.finished {
            return Ok(None);
        }

        let pacer = Pacer::sleep(self.delay);
        let mut on_delay = self.on_delay.take();
        let mut stop = || on_delay.as_mut().is_some_and(|cancel| cancel());
        let result = self.next_line_with(&mut stop, &pacer);
        self.on_delay = on_delay;

        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result
    }

    /// Polls until a line arrives, asking `stop` before every pause.
    pub(crate) fn next_line_with(
        &mut self,
        stop: &mut dyn FnMut() -> bool,
        pacer: &Pacer,
    ) -> Result<Option<Vec<u8>>> {
        loop {
            if let Some(line) = self.poll_line()? {
                return Ok(Some(line));
            }
            if stop() {
                return Ok(None);
            }
            pacer.pause();
        }
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

impl<R: Read + Seek> Iterator for Follower<R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

/// Follows `stream` from its end, polling every `delay`.
pub fn follow<R: Read + Seek>(stream: R, delay: Duration) -> Result<Follower<R>> {
    Follower::new(stream, delay)
}
