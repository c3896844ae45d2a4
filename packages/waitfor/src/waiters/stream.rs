use futures_util::StreamExt;

use super::Args;
use crate::{
    bridge::Completion,
    error::{Result, invalid_argument},
    registry::{Registry, Waiter},
    value::{Chunk, Value},
};

/// `stream(readable)`: reads a [`ReadableStream`](crate::ReadableStream) to its end.
///
/// The result takes its type from the first chunk: byte chunks concatenate into
/// [`Value::Bytes`], text chunks into [`Value::String`]. An empty stream gives an empty list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stream;

impl Stream {
    /// The registered name.
    pub const NAME: &'static str = "stream";
}

impl Waiter for Stream {
    fn wait(&self, registry: &Registry, args: Vec<Value>) -> Result {
        let readable = Args::new(Self::NAME, args).take("readableStream", |value| match value {
            Value::Stream(readable) => Ok(readable),
            other => Err(other),
        })?;
        let Some(chunks) = readable.take() else {
            return invalid_argument(Self::NAME, "readableStream", Some(&readable.into()));
        };

        let done = Completion::new();
        waitfor_async::spawn({
            let done = done.clone();
            async move { done.complete(chunks.collect::<Vec<_>>().await) }
        })
        .detach();

        Ok(concat(registry.wait_for(&done)))
    }

    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }
}

fn concat(chunks: Vec<Chunk>) -> Value {
    match chunks.first() {
        None => Value::List(Vec::new()),
        Some(Chunk::Bytes(_)) => Value::Bytes(
            chunks
                .into_iter()
                .flat_map(|chunk| match chunk {
                    Chunk::Bytes(bytes) => bytes,
                    Chunk::Text(text) => text.into_bytes(),
                })
                .collect(),
        ),
        Some(Chunk::Text(_)) => Value::String(
            chunks
                .into_iter()
                .map(|chunk| match chunk {
                    Chunk::Text(text) => text,
                    Chunk::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ReadableStream, WaitConfig, WaitError};

    fn registry() -> Registry {
        Registry::with_builtins(WaitConfig::default())
    }

    #[test]
    fn concatenates_bytes() {
        let readable = ReadableStream::from_reader(&b"wait for stuff"[..], 3);
        assert_eq!(
            registry().call("stream", vec![readable.into()]),
            Ok(b"wait for stuff".to_vec().into())
        );
    }

    #[test]
    fn joins_text() {
        let readable = ReadableStream::from_chunks(["wait ", "for ", "stuff"]);
        assert_eq!(
            registry().call("stream", vec![readable.into()]),
            Ok("wait for stuff".into())
        );
    }

    #[test]
    fn first_chunk_decides_the_type() {
        let readable = ReadableStream::from_chunks([Chunk::from("a"), Chunk::from(&b"b"[..])]);
        assert_eq!(
            registry().call("stream", vec![readable.into()]),
            Ok("ab".into())
        );
    }

    #[test]
    fn empty_stream_is_an_empty_list() {
        let readable = ReadableStream::from_chunks(Vec::<Chunk>::new());
        assert_eq!(
            registry().call("stream", vec![readable.into()]),
            Ok(Value::List(Vec::new()))
        );
    }

    #[test]
    fn consumed_stream_is_rejected() {
        let registry = registry();
        let readable = ReadableStream::from_chunks(["once"]);
        registry
            .call("stream", vec![readable.clone().into()])
            .unwrap();

        assert!(matches!(
            registry.call("stream", vec![readable.into()]),
            Err(WaitError::InvalidArgument {
                argument: "readableStream",
                ..
            })
        ));
    }
}
