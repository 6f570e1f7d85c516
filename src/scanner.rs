//! Backward and forward line-boundary scanning.
//!
//! Both scans walk the stream one window of `read_size` bytes at a time, so
//! memory use is bounded by the window regardless of the stream size. A
//! `\r\n` pair split across two windows is still treated as one terminator.

use crate::reader::ChunkReader;
use memchr::{memchr2, memrchr2};
use std::io::{self, Read, Seek};

/// Moves the cursor to the start of the logical line before the current position.
///
/// A terminator immediately before the cursor closes the current line and is
/// not counted. Returns the new position, or `None` once the start of the
/// stream is reached without finding a terminator; the cursor is then at 0.
pub fn seek_previous_line<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    read_size: usize,
) -> io::Result<Option<u64>> {
    let cursor = reader.position()?;
    let mut window_end = cursor;
    // First byte of the window scanned just before this one (the byte after it).
    let mut carried: Option<u8> = None;

    while window_end > 0 {
        let window_start = window_end.saturating_sub(read_size as u64);
        reader.seek(window_start)?;
        let (_, window) = reader.read((window_end - window_start) as usize)?;

        let mut end = window.len();
        while let Some(i) = memrchr2(b'\r', b'\n', &window[..end]) {
            let at = window_start + i as u64;
            let next = window.get(i + 1).copied().or(carried);
            // The `\r` of a `\r\n` pair does not start a line on its own.
            let starts_line = window[i] == b'\n' || next != Some(b'\n');

            if starts_line && at + 1 < cursor {
                let target = at + 1;
                reader.seek(target)?;
                return Ok(Some(target));
            }
            end = i;
        }

        carried = window.first().copied();
        window_end = window_start;
    }

    reader.seek(0)?;
    Ok(None)
}

/// Moves the cursor just past the next terminator at or after the current position.
///
/// Returns the new position, or `None` if the end of the stream is reached
/// first; the cursor is then left at the end of the scanned data.
pub fn seek_next_line<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    read_size: usize,
) -> io::Result<Option<u64>> {
    let mut window_start = reader.position()?;

    loop {
        let (len, window) = reader.read(read_size)?;
        if len == 0 {
            return Ok(None);
        }

        if let Some(i) = memchr2(b'\r', b'\n', &window) {
            let mut target = window_start + i as u64 + 1;
            if window[i] == b'\r' {
                let followed_by_lf = match window.get(i + 1) {
                    Some(&byte) => byte == b'\n',
                    // The window ends in `\r`: peek past it for a straddling `\n`.
                    None => reader.read_byte()? == Some(b'\n'),
                };
                if followed_by_lf {
                    target += 1;
                }
            }
            reader.seek(target)?;
            return Ok(Some(target));
        }

        window_start += len as u64;
        if len < read_size {
            return Ok(None);
        }
    }
}
