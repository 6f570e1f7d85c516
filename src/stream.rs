//! Async stream adapter over the blocking path follower.

use crate::error::{Error, Result};
use crate::options::FollowOptions;
use crate::path_follow::PathFollower;
use futures::Stream;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// A stream of decoded lines followed from a path.
///
/// The follower runs on tokio's blocking pool. Dropping the stream stops it
/// within one follow delay.
pub struct FollowStream {
    receiver: mpsc::UnboundedReceiver<Result<String>>,
    shutdown: Arc<AtomicBool>,
    _task_handle: JoinHandle<()>,
}

impl FollowStream {
    /// Starts following `path` from its end. Must be called within a tokio runtime.
    pub async fn new<P: AsRef<Path>>(path: P, options: FollowOptions) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));

        let task_shutdown = Arc::clone(&shutdown);
        let probe = tx.clone();
        let follower = PathFollower::new(path, options)?.on_delay(move || {
            task_shutdown.load(Ordering::SeqCst) || probe.is_closed()
        });

        let task_handle = tokio::task::spawn_blocking(move || follow_task(follower, tx));

        Ok(FollowStream {
            receiver: rx,
            shutdown,
            _task_handle: task_handle,
        })
    }

    /// Check if the stream has been closed/dropped
    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }
}

impl Drop for FollowStream {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

/// Forwards lines until cancelled, the receiver is gone, or a fatal error.
fn follow_task(mut follower: PathFollower, tx: mpsc::UnboundedSender<Result<String>>) {
    loop {
        match follower.next_line() {
            Ok(Some(line)) => {
                if tx.send(Ok(line)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                // Only an undecodable line leaves the follower usable.
                let fatal = !matches!(e, Error::Decode { .. });
                if tx.send(Err(e)).is_err() || fatal {
                    break;
                }
            }
        }
    }
    debug!(path = %follower.path().display(), "follow task finished");
}

impl Stream for FollowStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TempLogFile;
    use std::time::Duration;
    use tokio_stream::StreamExt;

    fn options() -> FollowOptions {
        FollowOptions::default().delay(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_follow_stream_creation() {
        let log = TempLogFile::new().unwrap();
        let stream = FollowStream::new(log.path(), options()).await;
        assert!(stream.is_ok());

        let stream = stream.unwrap();
        assert!(!stream.is_closed());
    }

    #[tokio::test]
    async fn test_follow_stream_nonexistent_file() {
        let log = TempLogFile::missing().unwrap();
        let stream = FollowStream::new(log.path(), options()).await.unwrap();
        assert!(!stream.is_closed());
    }

    #[tokio::test]
    async fn test_follow_stream_yields_appended_lines() {
        let log = TempLogFile::with_content("existing").unwrap();
        let mut stream = FollowStream::new(log.path(), options()).await.unwrap();

        log.append_content("Line 1").unwrap();
        log.append_raw(b"Line 2\r\n").unwrap();

        let first = tokio::time::timeout(Duration::from_secs(5), stream.next()).await;
        assert_eq!(first.unwrap().unwrap().unwrap(), "Line 1");
        let second = tokio::time::timeout(Duration::from_secs(5), stream.next()).await;
        assert_eq!(second.unwrap().unwrap().unwrap(), "Line 2");
    }

    #[tokio::test]
    async fn test_follow_stream_forwards_decode_errors() {
        let log = TempLogFile::new().unwrap();
        let mut stream = FollowStream::new(log.path(), options()).await.unwrap();

        log.append_raw(b"\xff\nok\n").unwrap();

        let first = tokio::time::timeout(Duration::from_secs(5), stream.next()).await;
        assert!(matches!(first.unwrap(), Some(Err(Error::Decode { .. }))));
        let second = tokio::time::timeout(Duration::from_secs(5), stream.next()).await;
        assert_eq!(second.unwrap().unwrap().unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_follow_task_stops_on_shutdown_flag() {
        let log = TempLogFile::new().unwrap();
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let follower = PathFollower::new(log.path(), options())
            .unwrap()
            .on_delay(move || flag.load(Ordering::SeqCst));
        let (tx, _rx) = mpsc::unbounded_channel();

        let task_handle = tokio::task::spawn_blocking(move || follow_task(follower, tx));
        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.store(true, Ordering::SeqCst);

        let result = tokio::time::timeout(Duration::from_secs(1), task_handle).await;
        assert!(result.is_ok());
        tokio_test::assert_ok!(result.unwrap());
    }

    #[tokio::test]
    async fn test_follow_task_stops_when_receiver_dropped() {
        let log = TempLogFile::new().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let probe = tx.clone();
        let follower = PathFollower::new(log.path(), options())
            .unwrap()
            .on_delay(move || probe.is_closed());

        drop(rx);
        let task_handle = tokio::task::spawn_blocking(move || follow_task(follower, tx));

        let result = tokio::time::timeout(Duration::from_secs(1), task_handle).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_follow_stream_graceful_shutdown_on_drop() {
        let log = TempLogFile::new().unwrap();
        let mut stream = FollowStream::new(log.path(), options()).await.unwrap();
        let task_handle = std::mem::replace(&mut stream._task_handle, tokio::spawn(async {}));

        drop(stream);

        let result = tokio::time::timeout(Duration::from_secs(1), task_handle).await;
        assert!(result.is_ok(), "follow task still running after drop");
        tokio_test::assert_ok!(result.unwrap());
    }
}
