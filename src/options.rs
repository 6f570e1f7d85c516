//! Defaults and follow configuration.

use crate::decode::{DecodePolicy, Decoder};
use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_8};
use std::time::Duration;

/// Number of lines returned by head and tail when not specified.
pub const DEFAULT_LINES: usize = 10;

/// Bytes read per scan window.
pub const DEFAULT_READ_SIZE: usize = 1024;

/// Pause between polls while following.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

pub(crate) fn check_read_size(read_size: usize) -> Result<usize> {
    if read_size == 0 {
        return Err(Error::InvalidReadSize { read_size });
    }
    Ok(read_size)
}

/// Configuration for following a file by path.
///
/// ```
/// use std::time::Duration;
/// use tailer::{DecodePolicy, FollowOptions};
///
/// let options = FollowOptions::default()
///     .delay(Duration::from_millis(250))
///     .decode_policy(DecodePolicy::Replace)
///     .with_encoding_label("latin1")
///     .unwrap();
/// assert_eq!(options.encoding.name(), "windows-1252");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FollowOptions {
    /// Longest pause between polls when no complete line is available.
    pub delay: Duration,
    /// Encoding used to turn followed lines into text.
    pub encoding: &'static Encoding,
    /// What to do with bytes that are malformed in `encoding`.
    pub decode_policy: DecodePolicy,
    /// Wake up early on filesystem events for the followed file.
    pub watch: bool,
}

impl Default for FollowOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            encoding: UTF_8,
            decode_policy: DecodePolicy::default(),
            watch: false,
        }
    }
}

impl FollowOptions {
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Selects the encoding by WHATWG label, such as `"utf-8"` or `"latin1"`.
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self> {
        self.encoding = Encoding::for_label(label.as_bytes()).ok_or_else(|| Error::UnknownEncoding {
            label: label.to_string(),
        })?;
        Ok(self)
    }

    pub fn decode_policy(mut self, decode_policy: DecodePolicy) -> Self {
        self.decode_policy = decode_policy;
        self
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn decoder(&self) -> Decoder {
        Decoder::new(self.encoding, self.decode_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FollowOptions::default();
        assert_eq!(options.delay, Duration::from_secs(1));
        assert_eq!(options.encoding, UTF_8);
        assert_eq!(options.decode_policy, DecodePolicy::Strict);
        assert!(!options.watch);
    }

    #[test]
    fn test_builder_methods() {
        let options = FollowOptions::default()
            .delay(Duration::from_millis(5))
            .decode_policy(DecodePolicy::Ignore)
            .watch(true);

        assert_eq!(options.delay, Duration::from_millis(5));
        assert_eq!(options.decode_policy, DecodePolicy::Ignore);
        assert!(options.watch);
    }

    #[test]
    fn test_unknown_encoding_label() {
        match FollowOptions::default().with_encoding_label("no-such-encoding") {
            Err(Error::UnknownEncoding { label }) => assert_eq!(label, "no-such-encoding"),
            other => panic!("Expected UnknownEncoding, got {other:?}"),
        }
    }

    #[test]
    fn test_check_read_size() {
        assert_eq!(check_read_size(1).unwrap(), 1);
        assert!(matches!(
            check_read_size(0),
            Err(Error::InvalidReadSize { read_size: 0 })
        ));
    }
}
