//! Relation databag schemas.
//!
//! Relation data is a flat string-to-string store per participant. Fields
//! holding structured values carry them JSON-encoded.

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::error::ParseError;

/// Key-value data of one relation participant
pub type Databag = BTreeMap<String, String>;

/// Field a requester writes its CSR to
pub const CSR_FIELD: &str = "certificate_signing_request";

/// Field the truststore publishes the trust map under
pub const TRUST_FIELD: &str = "trust";

/// Field the CA integration publishes issued certificates under
pub const CERTIFICATES_FIELD: &str = "certificates";

/// Read an opaque token field from a databag.
///
/// Absent and empty values mean "not submitted yet". Anything else is
/// returned byte-for-byte; the content is never interpreted.
pub fn token_field(bag: &Databag, field: &str) -> Option<String> {
    bag.get(field).filter(|value| !value.is_empty()).cloned()
}

/// Decode a JSON-encoded field from `identity`'s databag.
///
/// Absent or blank values yield `Ok(None)`.
pub fn json_field<T: DeserializeOwned>(
    identity: &str,
    bag: &Databag,
    field: &str,
) -> Result<Option<T>, ParseError> {
    match bag.get(field) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => serde_json::from_str(raw)
            .map(Some)
            .map_err(|e| ParseError::new(identity, format!("`{field}` is not valid JSON: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(value: &str) -> Databag {
        Databag::from([(CSR_FIELD.to_string(), value.to_string())])
    }

    #[test]
    fn missing_and_empty_are_not_submitted() {
        assert_eq!(token_field(&Databag::new(), CSR_FIELD), None);
        assert_eq!(token_field(&bag(""), CSR_FIELD), None);
    }

    #[test]
    fn pem_value_is_accepted_verbatim() {
        let pem = "-----BEGIN CERTIFICATE REQUEST-----\nMIIB\n-----END CERTIFICATE REQUEST-----\n";
        assert_eq!(token_field(&bag(pem), CSR_FIELD).as_deref(), Some(pem));
    }

    #[test]
    fn blank_and_control_values_are_opaque_tokens() {
        assert_eq!(token_field(&bag("   "), CSR_FIELD).as_deref(), Some("   "));
        assert_eq!(token_field(&bag("12\u{1}3"), CSR_FIELD).as_deref(), Some("12\u{1}3"));
    }

    #[test]
    fn json_field_decodes() {
        let bag = Databag::from([("list".to_string(), r#"["a","b"]"#.to_string())]);
        let list: Option<Vec<String>> = json_field("app", &bag, "list").unwrap();
        assert_eq!(list.unwrap(), vec!["a", "b"]);

        let missing: Option<Vec<String>> = json_field("app", &bag, "other").unwrap();
        assert!(missing.is_none());

        let bad = Databag::from([("list".to_string(), "[".to_string())]);
        let err = json_field::<Vec<String>>("app", &bad, "list").unwrap_err();
        assert_eq!(err.identity, "app");
    }
}
