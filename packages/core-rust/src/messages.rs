//! Request and response records exchanged with the HTTP transport.
//!
//! Field names follow the JSON wire format: requests carry the input under
//! `s`, responses carry the result under `v`. A business failure is reported
//! in `err`, which is omitted entirely when the operation succeeded. A
//! request without `s` decodes as the empty string.

use serde::{Deserialize, Serialize};

use crate::service::ServiceError;

/// Input to the `uppercase` operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UppercaseRequest {
    #[serde(default)]
    pub s: String,
}

/// Output of the `uppercase` operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UppercaseResponse {
    pub v: String,
    /// Failure message, present only when the operation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl UppercaseResponse {
    /// Maps the service result onto the wire record. A failure keeps `v` empty
    /// and carries the error's display text.
    #[must_use]
    pub fn from_result(result: Result<String, ServiceError>) -> Self {
        match result {
            Ok(v) => Self { v, err: None },
            Err(e) => Self {
                v: String::new(),
                err: Some(e.to_string()),
            },
        }
    }
}

/// Input to the `count` operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountRequest {
    #[serde(default)]
    pub s: String,
}

/// Output of the `count` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub v: usize,
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn successful_uppercase_omits_err_field() {
        let resp = UppercaseResponse::from_result(Ok("HELLO".to_string()));
        assert_eq!(serde_json::to_value(&resp).unwrap(), json!({ "v": "HELLO" }));
    }

    #[test]
    fn failed_uppercase_carries_err_text() {
        let resp = UppercaseResponse::from_result(Err(ServiceError::EmptyInput));
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({ "v": "", "err": "empty string" })
        );
    }

    #[test]
    fn count_response_has_only_value() {
        let resp = CountResponse { v: 5 };
        assert_eq!(serde_json::to_value(resp).unwrap(), json!({ "v": 5 }));
    }

    #[test]
    fn requests_decode_from_wire_shape() {
        let up: UppercaseRequest = serde_json::from_str(r#"{"s":"hello"}"#).unwrap();
        assert_eq!(up.s, "hello");
        let count: CountRequest = serde_json::from_str(r#"{"s":""}"#).unwrap();
        assert_eq!(count.s, "");
    }

    #[test]
    fn request_without_s_decodes_as_empty() {
        let upper: UppercaseRequest = serde_json::from_str(r#"{"text":"x"}"#).unwrap();
        assert_eq!(upper.s, "");
        let count: CountRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(count.s, "");
    }

    #[test]
    fn request_with_wrong_type_fails_to_decode() {
        assert!(serde_json::from_str::<CountRequest>(r#"{"s":5}"#).is_err());
    }

    proptest! {
        #[test]
        fn uppercase_response_survives_json(v in ".*", err in proptest::option::of(".*")) {
            let resp = UppercaseResponse { v, err };
            let bytes = serde_json::to_vec(&resp).unwrap();
            let back: UppercaseResponse = serde_json::from_slice(&bytes).unwrap();
            prop_assert_eq!(back, resp);
        }

        #[test]
        fn count_response_survives_json(v in any::<u32>()) {
            let resp = CountResponse { v: v as usize };
            let bytes = serde_json::to_vec(&resp).unwrap();
            let back: CountResponse = serde_json::from_slice(&bytes).unwrap();
            prop_assert_eq!(back, resp);
        }
    }
}
