//! Handler output.
//!
//! `Response` lets handlers return a single reply, a list of replies or a
//! stream of replies. A `None` reply is a deliberate "nothing to send" and an
//! `Err` item ends the handler's output with a correlated error reply.

use std::{fmt, pin::Pin};

use futures::{
    StreamExt,
    stream::{self, Stream},
};

use crate::{error::EtpError, message::Message, schema::Body};

/// A type alias for a type-erased, dynamically dispatched stream of replies.
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<Option<Message>, EtpError>> + Send + 'static>>;

/// Represents the full response to a request.
pub enum Response {
    /// A single reply.
    Single(Message),
    /// A list of replies; `None` entries are skipped by the session.
    Vec(Vec<Option<Message>>),
    /// A potentially long stream of replies.
    Stream(ReplyStream),
    /// No reply at all.
    Empty,
}

impl Response {
    /// Build a single reply from a body.
    #[must_use]
    pub fn reply(body: impl Into<Body>) -> Self { Self::Single(Message::from_body(body)) }

    /// Flatten the response into one stream.
    #[must_use]
    pub fn into_stream(self) -> ReplyStream {
        match self {
            Response::Single(message) => stream::iter([Ok(Some(message))]).boxed(),
            Response::Vec(replies) => stream::iter(replies.into_iter().map(Ok)).boxed(),
            Response::Stream(replies) => replies,
            Response::Empty => stream::empty().boxed(),
        }
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Single(message) => f.debug_tuple("Single").field(message).finish(),
            Response::Vec(v) => f.debug_tuple("Vec").field(v).finish(),
            Response::Stream(_) => f.write_str("Stream(..)"),
            Response::Empty => f.write_str("Empty"),
        }
    }
}

impl From<Message> for Response {
    fn from(message: Message) -> Self { Response::Single(message) }
}

impl From<Vec<Message>> for Response {
    fn from(v: Vec<Message>) -> Self { Response::Vec(v.into_iter().map(Some).collect()) }
}

impl From<Vec<Option<Message>>> for Response {
    fn from(v: Vec<Option<Message>>) -> Self { Response::Vec(v) }
}

#[cfg(test)]
mod tests {
    use futures::{StreamExt, stream};

    use super::Response;
    use crate::{error::EtpError, message::Message, schema::core::Pong};

    async fn collect(response: Response) -> Vec<Result<Option<Message>, EtpError>> {
        response.into_stream().collect().await
    }

    #[tokio::test]
    async fn single_and_empty_flatten() {
        let replies = collect(Response::reply(Pong::default())).await;
        assert_eq!(replies.len(), 1);
        assert!(matches!(&replies[0], Ok(Some(m)) if m.header().message_type == 9));

        assert!(collect(Response::Empty).await.is_empty());
    }

    #[tokio::test]
    async fn vec_keeps_deliberate_none() {
        let replies = collect(Response::from(vec![None, Some(Message::from_body(Pong::default()))])).await;
        assert!(matches!(replies.as_slice(), [Ok(None), Ok(Some(_))]));
    }

    #[tokio::test]
    async fn stream_passes_errors_through() {
        let response = Response::Stream(
            stream::iter([Ok(None), Err(EtpError::NotFound)]).boxed(),
        );
        let replies = collect(response).await;
        assert_eq!(replies.last(), Some(&Err(EtpError::NotFound)));
    }

    #[test]
    fn debug_hides_stream_contents() {
        let response = Response::Stream(futures::stream::empty().boxed());
        assert_eq!(format!("{response:?}"), "Stream(..)");
    }
}
