//! HTTP request types for the log server.

use serde_json::{Map, Value};

use super::error::ApiError;
use crate::model::{LogId, leading_integer};
use crate::query::FetchOptions;

/// Body of a pull request, as sent by polling clients.
///
/// ```json
/// { "secret_key": "sk_...", "last_id": 1200, "limit": 500 }
/// ```
///
/// Fields are extracted on demand so the credential can be checked before
/// the cursor fields are interpreted.
#[derive(Debug)]
pub struct FetchRequest {
    fields: Map<String, Value>,
}

impl FetchRequest {
    /// Parse a request body.
    ///
    /// Fails with [`ApiError::InvalidJson`] if the body is not JSON. A JSON
    /// value that is not an object parses to a request with no fields.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;
        let fields = match value {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        Ok(Self { fields })
    }

    /// The caller's credential.
    ///
    /// Absent or `null` is [`ApiError::MissingSecretKey`]; a present value
    /// that is not a string cannot match and is [`ApiError::InvalidSecretKey`].
    pub fn secret_key(&self) -> Result<&str, ApiError> {
        match self.fields.get("secret_key") {
            None | Some(Value::Null) => Err(ApiError::MissingSecretKey),
            Some(Value::String(secret)) => Ok(secret.as_str()),
            Some(_) => Err(ApiError::InvalidSecretKey),
        }
    }

    /// The client cursor exactly as sent, coerced to an integer.
    ///
    /// Never fails, so existing pollers sending loosely typed cursors keep
    /// working: absent or `null` is 0, floats are truncated, booleans are
    /// 0 or 1, strings contribute their leading integer (`"2abc"` is 2,
    /// `"abc"` is 0) and arrays or objects are 1 when non-empty.
    pub fn last_id(&self) -> i64 {
        match self.fields.get("last_id") {
            None | Some(Value::Null) => 0,
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|_| i64::MAX))
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Some(Value::Bool(b)) => i64::from(*b),
            Some(Value::String(s)) => leading_integer(s),
            Some(Value::Array(items)) => i64::from(!items.is_empty()),
            Some(Value::Object(fields)) => i64::from(!fields.is_empty()),
        }
    }

    /// The store cursor for [`last_id`](Self::last_id). Negative cursors
    /// read from the beginning.
    pub fn cursor(&self) -> LogId {
        LogId::try_from(self.last_id()).unwrap_or(0)
    }

    /// Optional page-size limit; absent or `null` means unlimited.
    pub fn fetch_options(&self) -> Result<FetchOptions, ApiError> {
        const INVALID: ApiError =
            ApiError::InvalidField("limit must be a non-negative integer");

        let limit = match self.fields.get("limit") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => {
                let limit = n.as_u64().ok_or(INVALID)?;
                Some(usize::try_from(limit).unwrap_or(usize::MAX))
            }
            Some(_) => return Err(INVALID),
        };
        Ok(FetchOptions { limit })
    }
}
