use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::database::TodoId;
use crate::error::ApiError;

/// JSON body extractor that answers every decoding failure with the API's own
/// `400 bad_request` body. The `Content-Type` request header is not required.
///
/// Only the first JSON value of the body is read; anything after it is
/// ignored. That value must be an object or `null` (treated as `{}`). Object
/// keys match field names case-insensitively, with an exactly-lowercase key
/// taking precedence, and `null` members leave the field at its default.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Failed to read request body: {}", e);
            ApiError::bad_request("invalid input")
        })?;

        let object = first_object(&bytes).ok_or_else(|| ApiError::bad_request("invalid input"))?;

        serde_json::from_value(Value::Object(object))
            .map(JsonBody)
            .map_err(|e| {
                tracing::debug!("Failed to decode request body: {}", e);
                ApiError::bad_request("invalid input")
            })
    }
}

/// Read the leading JSON value and normalize it into an object with
/// lowercase keys and no `null` members.
fn first_object(bytes: &[u8]) -> Option<Map<String, Value>> {
    let value = match serde_json::Deserializer::from_slice(bytes)
        .into_iter::<Value>()
        .next()?
    {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Failed to parse request body: {}", e);
            return None;
        }
    };

    let members = match value {
        Value::Null => return Some(Map::new()),
        Value::Object(members) => members,
        other => {
            tracing::debug!("Request body is not an object: {}", other);
            return None;
        }
    };

    let mut folded = Map::new();
    let (exact, mixed): (Vec<_>, Vec<_>) = members
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .partition(|(k, _)| *k == k.to_lowercase());
    for (key, value) in exact {
        folded.insert(key, value);
    }
    for (key, value) in mixed {
        folded.entry(key.to_lowercase()).or_insert(value);
    }
    Some(folded)
}

/// Parse a to-do id path segment: plain decimal digits, no sign.
pub fn parse_todo_id(raw: &str) -> Result<TodoId, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::bad_request("invalid input, id must be integer"));
    }
    raw.parse()
        .map_err(|_| ApiError::bad_request("invalid input, id must be integer"))
}
