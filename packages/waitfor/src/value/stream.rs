use std::{cell::RefCell, fmt, io::Read, rc::Rc};

use futures_core::Stream;
use futures_util::stream::{self, LocalBoxStream, StreamExt};

/// One piece of data delivered by a [`ReadableStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Binary data.
    Bytes(Vec<u8>),
    /// Text data.
    Text(String),
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Chunk {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<String> for Chunk {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Chunk {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

/// A readable stream of [`Chunk`]s that ends when the underlying stream does.
///
/// The stream can be read once. The handle is shared, so after one consumer has taken the
/// chunks every clone reports [`is_consumed`](ReadableStream::is_consumed).
#[derive(Clone)]
pub struct ReadableStream {
    inner: Rc<RefCell<Option<LocalBoxStream<'static, Chunk>>>>,
}

impl ReadableStream {
    /// Wraps any stream of chunks.
    pub fn new(stream: impl Stream<Item = Chunk> + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Some(stream.boxed_local()))),
        }
    }

    /// A stream that delivers the given chunks, one per scheduler turn.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Chunk> + 'static,
        I::IntoIter: 'static,
    {
        Self::new(stream::iter(chunks).then(|chunk| async move {
            waitfor_async::yield_now().await;
            Into::<Chunk>::into(chunk)
        }))
    }

    /// A stream of byte chunks of at most `chunk_size` bytes read from `reader`.
    ///
    /// Reading yields to the scheduler between chunks. A read error ends the stream.
    pub fn from_reader(reader: impl Read + 'static, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self::new(stream::unfold(reader, move |mut reader| async move {
            waitfor_async::yield_now().await;

            let mut buf = vec![0; chunk_size];
            match reader.read(&mut buf) {
                Ok(0) => None,
                Ok(read) => {
                    buf.truncate(read);
                    Some((Chunk::Bytes(buf), reader))
                }
                Err(err) => {
                    log::warn!("readable stream ended early: {err}");
                    None
                }
            }
        }))
    }

    /// Takes the underlying stream, leaving this handle consumed.
    pub(crate) fn take(&self) -> Option<LocalBoxStream<'static, Chunk>> {
        self.inner.borrow_mut().take()
    }

    /// Whether the chunks have already been taken by a reader.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.inner.borrow().is_none()
    }

    /// Returns `true` if both handles refer to the same stream.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ReadableStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadableStream")
            .field("consumed", &self.is_consumed())
            .finish()
    }
}
