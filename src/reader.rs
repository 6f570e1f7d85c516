//! Bounded window reads over a seekable byte stream.

use std::io::{self, Read, Seek, SeekFrom};

// Windows are sized by the caller; never reserve more than this up front.
const MAX_RESERVE: usize = 64 * 1024;

/// Reads fixed-size windows from arbitrary positions of a byte stream.
///
/// I/O errors from the wrapped handle are returned unchanged.
#[derive(Debug)]
pub struct ChunkReader<R> {
    inner: R,
}

impl<R: Read + Seek> ChunkReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads up to `n` bytes from the current position.
    ///
    /// Returns the number of bytes read and the data. Fewer than `n` bytes
    /// means the end of the stream was reached.
    pub fn read(&mut self, n: usize) -> io::Result<(usize, Vec<u8>)> {
        let mut data = Vec::with_capacity(n.min(MAX_RESERVE));
        self.inner.by_ref().take(n as u64).read_to_end(&mut data)?;
        Ok((data.len(), data))
    }

    /// Reads a single byte, `None` at end of stream.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let (len, data) = self.read(1)?;
        Ok(if len == 1 { Some(data[0]) } else { None })
    }

    /// Reads everything from the current position to the end of the stream.
    pub fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.inner.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Repositions the stream absolutely.
    pub fn seek(&mut self, pos: u64) -> io::Result<u64> {
        self.inner.seek(SeekFrom::Start(pos))
    }

    pub fn seek_end(&mut self) -> io::Result<u64> {
        self.inner.seek(SeekFrom::End(0))
    }

    pub fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    /// Live size of the stream. The current position is preserved.
    pub fn size(&mut self) -> io::Result<u64> {
        let position = self.inner.stream_position()?;
        let size = self.inner.seek(SeekFrom::End(0))?;
        if position != size {
            self.inner.seek(SeekFrom::Start(position))?;
        }
        Ok(size)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// A read position past the end of the stream means the stream was truncated.
pub(crate) fn detect_truncation(current_size: u64, position: u64) -> bool {
    current_size < position
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_full_window() {
        let mut reader = ChunkReader::new(Cursor::new(b"abcdef".to_vec()));
        let (len, data) = reader.read(4).unwrap();

        assert_eq!(len, 4);
        assert_eq!(data, b"abcd");
        assert_eq!(reader.position().unwrap(), 4);
    }

    #[test]
    fn test_short_read_signals_end_of_stream() {
        let mut reader = ChunkReader::new(Cursor::new(b"abc".to_vec()));
        reader.seek(1).unwrap();
        let (len, data) = reader.read(10).unwrap();

        assert_eq!(len, 2);
        assert_eq!(data, b"bc");

        let (len, data) = reader.read(10).unwrap();
        assert_eq!(len, 0);
        assert!(data.is_empty());
    }

    #[test]
    fn test_huge_window_reads_what_is_there() {
        let mut reader = ChunkReader::new(Cursor::new(b"abc".to_vec()));
        let (len, data) = reader.read(usize::MAX).unwrap();
        assert_eq!(len, 3);
        assert_eq!(data, b"abc");

        reader.seek(1).unwrap();
        assert_eq!(reader.read(1 << 40).unwrap().1, b"bc");
    }

    #[test]
    fn test_read_byte() {
        let mut reader = ChunkReader::new(Cursor::new(b"x".to_vec()));
        assert_eq!(reader.read_byte().unwrap(), Some(b'x'));
        assert_eq!(reader.read_byte().unwrap(), None);
    }

    #[test]
    fn test_size_preserves_position() {
        let mut reader = ChunkReader::new(Cursor::new(b"0123456789".to_vec()));
        reader.seek(3).unwrap();

        assert_eq!(reader.size().unwrap(), 10);
        assert_eq!(reader.position().unwrap(), 3);
    }

    #[test]
    fn test_read_to_end_from_middle() {
        let mut reader = ChunkReader::new(Cursor::new(b"line 1\nline 2\n".to_vec()));
        reader.seek(7).unwrap();
        assert_eq!(reader.read_to_end().unwrap(), b"line 2\n");
    }

    #[test]
    fn test_seek_end() {
        let mut reader = ChunkReader::new(Cursor::new(b"abc".to_vec()));
        assert_eq!(reader.seek_end().unwrap(), 3);
        assert_eq!(reader.read(1).unwrap().0, 0);
    }

    #[test]
    fn test_detect_truncation() {
        assert!(detect_truncation(100, 200)); // File was truncated
        assert!(!detect_truncation(200, 100)); // File grew
        assert!(!detect_truncation(100, 100)); // No change
    }
}
