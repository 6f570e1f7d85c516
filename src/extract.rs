//! Head and tail extraction on top of the line scanner.

use crate::error::Result;
use crate::follow::Follower;
use crate::options::{DEFAULT_READ_SIZE, check_read_size};
use crate::reader::ChunkReader;
use crate::scanner;
use crate::terminator::logical_lines;
use std::io::{Read, Seek};
use std::time::Duration;

/// Head, tail and follow over a single seekable byte stream.
///
/// The stream is owned for the lifetime of the `Tailer`; pass `&mut file` to
/// keep using the file afterwards.
#[derive(Debug)]
pub struct Tailer<R> {
    reader: ChunkReader<R>,
    read_size: usize,
}

impl<R: Read + Seek> Tailer<R> {
    /// Creates a tailer scanning with the default window of 1024 bytes.
    pub fn new(stream: R) -> Self {
        Self {
            reader: ChunkReader::new(stream),
            read_size: DEFAULT_READ_SIZE,
        }
    }

    /// Creates a tailer with a custom scan window. Fails if `read_size` is 0.
    pub fn with_read_size(stream: R, read_size: usize) -> Result<Self> {
        Ok(Self {
            reader: ChunkReader::new(stream),
            read_size: check_read_size(read_size)?,
        })
    }

    /// Moves the cursor to the end of the stream.
    pub fn at_end(mut self) -> Result<Self> {
        self.reader.seek_end()?;
        Ok(self)
    }

    pub fn read_size(&self) -> usize {
        self.read_size
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.reader.position()?)
    }

    /// See [`scanner::seek_previous_line`].
    pub fn seek_previous_line(&mut self) -> Result<Option<u64>> {
        Ok(scanner::seek_previous_line(&mut self.reader, self.read_size)?)
    }

    /// See [`scanner::seek_next_line`].
    pub fn seek_next_line(&mut self) -> Result<Option<u64>> {
        Ok(scanner::seek_next_line(&mut self.reader, self.read_size)?)
    }

    /// Returns the last `lines` logical lines, oldest first.
    pub fn tail(&mut self, lines: usize) -> Result<Vec<Vec<u8>>> {
        self.reader.seek_end()?;

        for _ in 0..lines {
            if self.seek_previous_line()?.is_none() {
                break;
            }
        }

        let data = self.reader.read_to_end()?;
        Ok(logical_lines(&data))
    }

    /// Returns the first `lines` logical lines.
    pub fn head(&mut self, lines: usize) -> Result<Vec<Vec<u8>>> {
        self.reader.seek(0)?;

        for _ in 0..lines {
            if self.seek_next_line()?.is_none() {
                break;
            }
        }

        let end = self.reader.position()?;
        self.reader.seek(0)?;
        let (_, data) = self.reader.read(end as usize)?;
        Ok(logical_lines(&data))
    }

    /// Follows the stream from the current cursor position.
    pub fn follow(mut self, delay: Duration) -> Result<Follower<R>> {
        let cursor = self.reader.position()?;
        Ok(Follower::from_reader(self.reader, self.read_size, cursor, delay))
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}

/// Returns the last `lines` logical lines of `stream`, oldest first.
///
/// ```
/// use std::io::Cursor;
///
/// let lines = tailer::tail(Cursor::new(b"one\ntwo\r\nthree\r"), 2, 1024).unwrap();
/// assert_eq!(lines, vec![b"two".to_vec(), b"three".to_vec()]);
/// ```
pub fn tail<R: Read + Seek>(stream: R, lines: usize, read_size: usize) -> Result<Vec<Vec<u8>>> {
    Tailer::with_read_size(stream, read_size)?.tail(lines)
}

/// Returns the first `lines` logical lines of `stream`.
pub fn head<R: Read + Seek>(stream: R, lines: usize, read_size: usize) -> Result<Vec<Vec<u8>>> {
    Tailer::with_read_size(stream, read_size)?.head(lines)
}
