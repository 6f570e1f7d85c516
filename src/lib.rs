//! Head, tail and follow over byte streams, the way `head`, `tail` and
//! `tail -F` behave.
//!
//! Lines may end in `\n`, `\r\n` or `\r`, freely mixed. Head and tail scan
//! the stream one bounded window at a time from the relevant end, so large
//! files are never read whole. Following polls for appended lines, recovers
//! from truncation, and when following a path, from log rotation.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::fs::File;
//! use tailer::{FollowOptions, follow_path, tail};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut file = File::open("app.log")?;
//!     for line in tail(&mut file, 10, 1024)? {
//!         println!("{}", String::from_utf8_lossy(&line));
//!     }
//!
//!     for line in follow_path("app.log", FollowOptions::default())? {
//!         println!("{}", line?);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Internal modules - not part of public API
mod decode;
mod error;
mod extract;
mod follow;
mod identity;
mod options;
mod path_follow;
mod reader;
mod scanner;
mod stream;
mod terminator;
mod watcher;

#[cfg(test)]
mod test_helpers;

// Public API exports
pub use decode::{DecodePolicy, Decoder};
pub use error::{Error, Result};
pub use extract::{Tailer, head, tail};
pub use follow::{Follower, follow};
pub use identity::FileIdentity;
pub use options::{DEFAULT_DELAY, DEFAULT_LINES, DEFAULT_READ_SIZE, FollowOptions};
pub use path_follow::{PathFollower, follow_path};
pub use reader::ChunkReader;
pub use scanner::{seek_next_line, seek_previous_line};
pub use stream::FollowStream;
pub use terminator::{
    LineTerminator, logical_lines, prefix_terminator, split_lines, strip_trailing_terminator,
    suffix_terminator,
};

use std::path::Path;
use tokio_stream::Stream;

/// Creates a stream of lines followed from `path`, surviving rotation.
///
/// # Arguments
///
/// * `path` - File path to follow; it may not exist yet
/// * `options` - Delay, text encoding and decode policy
///
/// # Example
///
/// ```rust,no_run
/// use tailer::{FollowOptions, follow_path_stream};
/// use tokio_stream::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut stream = follow_path_stream("app.log", FollowOptions::default()).await?;
///
///     while let Some(line) = stream.next().await {
///         println!("{}", line?);
///     }
///
///     Ok(())
/// }
/// ```
pub async fn follow_path_stream<P: AsRef<Path>>(
    path: P,
    options: FollowOptions,
) -> Result<impl Stream<Item = Result<String>>> {
    FollowStream::new(path, options).await
}
