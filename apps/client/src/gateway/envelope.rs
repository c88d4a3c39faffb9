//! Interpretation of `{ success, ... }` response envelopes.
//!
//! A response counts as successful only when the HTTP status is 2xx *and* the
//! body carries `success: true`. Deletes are the exception and are judged by
//! HTTP status alone.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::ApiResponse;
use crate::errors::{ClientError, TransportError};

/// Decodes the payload stored under `field` in a successful envelope.
pub(crate) fn decode<T: DeserializeOwned>(
    response: &ApiResponse,
    field: &str,
) -> Result<T, ClientError> {
    let mut envelope = checked_envelope(response)?;
    let payload = envelope
        .as_object_mut()
        .and_then(|object| object.remove(field))
        .ok_or_else(|| {
            TransportError::Unsuccessful(format!("response is missing the '{field}' field"))
        })?;
    Ok(serde_json::from_value(payload)?)
}

/// Requires a successful envelope and returns it whole.
pub(crate) fn checked_envelope(response: &ApiResponse) -> Result<Value, ClientError> {
    if !response.is_success() {
        return Err(status_error(response));
    }

    let envelope: Value = serde_json::from_str(&response.body)?;
    match envelope.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(envelope),
        _ => Err(TransportError::Unsuccessful(
            error_message(&envelope)
                .unwrap_or_else(|| "response did not report success".to_string()),
        )
        .into()),
    }
}

/// For endpoints that answer with a bare HTTP status.
pub(crate) fn expect_status(response: &ApiResponse) -> Result<(), ClientError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(status_error(response))
    }
}

fn status_error(response: &ApiResponse) -> ClientError {
    let message = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| error_message(&body))
        .unwrap_or_else(|| response.body.trim().to_string());

    match response.status {
        401 | 403 => ClientError::Auth(if message.is_empty() {
            "Session expired or access denied".to_string()
        } else {
            message
        }),
        404 => ClientError::NotFound(message),
        409 => ClientError::Validation(message),
        status => TransportError::Api { status, message }.into(),
    }
}

fn error_message(body: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .find_map(|key| body.get(*key))
        .and_then(|value| match value {
            Value::String(text) => Some(text.clone()),
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(body: Value) -> ApiResponse {
        ApiResponse::new(200, body.to_string())
    }

    #[test]
    fn test_decodes_named_field() {
        let response = ok(json!({ "success": true, "csv": "a,b\n1,2" }));
        let csv: String = decode(&response, "csv").unwrap();
        assert_eq!(csv, "a,b\n1,2");
    }

    #[test]
    fn test_missing_success_flag_is_failure_even_on_200() {
        let response = ok(json!({ "jobs": [] }));
        let err = decode::<Vec<Value>>(&response, "jobs").unwrap_err();
        assert!(matches!(
            err,
            ClientError::Transport(TransportError::Unsuccessful(_))
        ));
    }

    #[test]
    fn test_false_success_surfaces_service_error() {
        let response = ok(json!({ "success": false, "error": "Already applied" }));
        let err = checked_envelope(&response).unwrap_err();
        assert_eq!(err.user_message(), "Already applied");
    }

    #[test]
    fn test_status_codes_map_to_taxonomy() {
        let unauthorized = ApiResponse::new(401, r#"{"error":"JWT expired"}"#);
        assert!(matches!(
            checked_envelope(&unauthorized),
            Err(ClientError::Auth(msg)) if msg == "JWT expired"
        ));

        let missing = ApiResponse::new(404, "");
        assert!(matches!(
            expect_status(&missing),
            Err(ClientError::NotFound(_))
        ));

        let conflict = ApiResponse::new(409, r#"{"message":"duplicate"}"#);
        assert!(matches!(
            checked_envelope(&conflict),
            Err(ClientError::Validation(msg)) if msg == "duplicate"
        ));

        let broken = ApiResponse::new(502, "bad gateway");
        assert!(matches!(
            expect_status(&broken),
            Err(ClientError::Transport(TransportError::Api { status: 502, .. }))
        ));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let response = ApiResponse::new(200, "<html>");
        assert!(matches!(
            checked_envelope(&response),
            Err(ClientError::Transport(TransportError::Parse(_)))
        ));
    }

    #[test]
    fn test_missing_field_is_failure() {
        let response = ok(json!({ "success": true }));
        assert!(decode::<Vec<Value>>(&response, "resumes").is_err());
    }
}
