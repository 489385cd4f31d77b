//! Domain model for the dog API.
//!
//! # Design
//! `Dog` mirrors the mock-server's schema but is defined independently;
//! integration tests catch any drift between the two crates. The client never
//! looks inside a `Dog`, it only forwards decode success or failure.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DecodeError;

/// A single dog listing returned by `GET dogs`.
///
/// Every field is required on the wire; a record missing any of them fails
/// to decode with [`DecodeErrorKind::MissingField`](crate::DecodeErrorKind::MissingField).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dog {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub breed: String,
    pub about: String,
    pub birthday: String,
    pub created: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub breeder_rating: f64,
    pub cost: f64,
}

/// Decode a JSON array of dogs.
pub fn decode_dogs(bytes: &[u8]) -> Result<Vec<Dog>, DecodeError> {
    serde_json::from_slice(bytes).map_err(DecodeError::from)
}
