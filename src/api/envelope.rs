use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SyncError;

/// Decode a 2xx body shaped `{ "success": bool, "error": string, ...payload }`.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, SyncError> {
    let value: Value = serde_json::from_slice(body)?;
    let success = value
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| SyncError::Decoding("missing `success` flag".into()))?;

    if !success {
        return Err(SyncError::Server(error_field(&value).unwrap_or_default()));
    }

    Ok(serde_json::from_value(value)?)
}

/// Classify a raw response: 2xx bodies go through [`decode_envelope`],
/// anything else becomes [`SyncError::Http`] carrying the envelope message.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, SyncError> {
    if (200..300).contains(&status) {
        return decode_envelope(body);
    }

    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| error_field(&value))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());

    Err(SyncError::Http { status, message })
}

fn error_field(value: &Value) -> Option<String> {
    value.get("error").and_then(Value::as_str).map(str::to_owned)
}
