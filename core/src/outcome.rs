//! The single result of one fetch, and the rules that produce it.

use bytes::Bytes;

use crate::error::{FetchError, TransportError};
use crate::http::HttpResponse;
use crate::types::{decode_dogs, Dog};

/// Result of one `fetch_dogs` call, delivered exactly once.
///
/// `Failure(None)` is a response that arrived but was not usable: a non-200
/// status, missing metadata or a missing body, with no transport error. It
/// carries no error value; callers tell it apart from success by the absent
/// collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Vec<Dog>),
    Failure(Option<FetchError>),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn collection(&self) -> Option<&[Dog]> {
        match self {
            Outcome::Success(dogs) => Some(dogs),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(err) => err.as_ref(),
        }
    }

    /// Split into the `(collection, error)` pair. At most one side is `Some`.
    pub fn into_parts(self) -> (Option<Vec<Dog>>, Option<FetchError>) {
        match self {
            Outcome::Success(dogs) => (Some(dogs), None),
            Outcome::Failure(err) => (None, err),
        }
    }
}

/// Turn the raw pieces a transport reports into an [`Outcome`].
///
/// A transport error always wins and is forwarded as-is. Otherwise anything
/// short of a 200 with a body is `Failure(None)`. Only then is the body
/// decoded.
pub fn classify_response(
    payload: Option<Bytes>,
    response: Option<HttpResponse>,
    error: Option<TransportError>,
) -> Outcome {
    if let Some(err) = error {
        return Outcome::Failure(Some(FetchError::Transport(err)));
    }
    let payload = match (response, payload) {
        (Some(response), Some(payload)) if response.status == 200 => payload,
        _ => return Outcome::Failure(None),
    };
    match decode_dogs(&payload) {
        Ok(dogs) => Outcome::Success(dogs),
        Err(err) => Outcome::Failure(Some(FetchError::Decode(err))),
    }
}
