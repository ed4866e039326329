// src/exec/capture.rs

//! Output capture: copy a child's pipe into a caller-supplied sink.

use std::fmt;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::debug;

const CHUNK_SIZE: usize = 8 * 1024;

/// Which of the child's output streams a capture refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => f.write_str("stdout"),
            Stream::Stderr => f.write_str("stderr"),
        }
    }
}

/// A capture that stopped early. `at` records when the failure was seen so
/// the runner can order it against the process exit.
#[derive(Debug)]
pub(crate) struct CaptureFailure {
    pub stream: Stream,
    pub at: Instant,
    pub source: io::Error,
}

/// Copy `pipe` into `sink` until EOF, flushing after every chunk so output is
/// forwarded while the child is still running.
///
/// On error the pipe is dropped (by returning), so the child observes a
/// closed pipe rather than blocking on a full one.
pub(crate) async fn drain<R, W>(
    pipe: Option<R>,
    sink: &mut W,
    stream: Stream,
) -> Result<u64, CaptureFailure>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    let Some(mut pipe) = pipe else {
        return Ok(0);
    };

    let fail = |source| CaptureFailure {
        stream,
        at: Instant::now(),
        source,
    };

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = pipe.read(&mut buf).await.map_err(fail)?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n]).await.map_err(fail)?;
        sink.flush().await.map_err(fail)?;
        total += n as u64;
    }

    debug!(%stream, bytes = total, "capture drained");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copies_everything_until_eof() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        let mut sink = Vec::new();

        let copied = drain(Some(&data[..]), &mut sink, Stream::Stdout)
            .await
            .expect("drain should succeed");

        assert_eq!(copied, data.len() as u64);
        assert_eq!(sink, data);
    }

    #[tokio::test]
    async fn missing_pipe_is_empty_capture() {
        let mut sink = Vec::new();
        let copied = drain(None::<&[u8]>, &mut sink, Stream::Stderr)
            .await
            .expect("drain should succeed");
        assert_eq!(copied, 0);
        assert!(sink.is_empty());
    }
}
