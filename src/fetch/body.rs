//! Size-capped response bodies.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::TryStreamExt;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio_util::io::StreamReader;

/// A response body that yields at most `limit` bytes.
///
/// Reads past the cap return EOF instead of pulling more data from the
/// connection. Dropping the body releases the underlying connection.
pub struct BoundedBody {
    reader: Pin<Box<dyn AsyncRead + Send>>,
    limit: u64,
    consumed: u64,
}

impl BoundedBody {
    /// Wraps the streaming body of `response`.
    pub(crate) fn from_response(response: reqwest::Response, limit: u64) -> Self {
        let stream = response.bytes_stream().map_err(io::Error::other);
        Self::from_reader(StreamReader::new(stream), limit)
    }

    /// Wraps any reader; used for pages that do not come from the network.
    pub fn from_reader<R>(reader: R, limit: u64) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self {
            reader: Box::pin(reader.take(limit)),
            limit,
            consumed: 0,
        }
    }

    /// The byte cap.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Bytes handed out so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// True once the cap has been hit; further reads return EOF.
    pub fn limit_reached(&self) -> bool {
        self.consumed >= self.limit
    }

    /// Reads the remainder of the body (up to the cap) into memory.
    pub async fn read_all(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.read_to_end(&mut buf).await?;
        Ok(buf)
    }
}

impl AsyncRead for BoundedBody {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = self.reader.as_mut().poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            self.consumed += (buf.filled().len() - before) as u64;
        }
        poll
    }
}

impl std::fmt::Debug for BoundedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedBody")
            .field("limit", &self.limit)
            .field("consumed", &self.consumed)
            .finish()
    }
}
