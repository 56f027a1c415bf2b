use crate::RedactedKey;

use serde::Serialize;

/// **VALUE**: Verifies the signing key never appears in Debug or Display output.
///
/// **WHY THIS MATTERS**: Descriptors and sessions are logged with `{:?}`. A leaked key lets
/// anyone on the machine forge kernel messages.
///
/// **BUG THIS CATCHES**: Would catch if someone replaces the manual Debug impl with a derive.
#[test]
fn given_key_when_formatted_then_value_is_redacted() {
    // GIVEN: A key with a recognizable value
    let key = RedactedKey::new("super-secret-signing-key");

    // WHEN: Formatting with Debug and Display
    let debug = format!("{key:?}");
    let display = format!("{key}");

    // THEN: Neither contains the secret
    assert!(!debug.contains("super-secret"), "Debug leaked the key");
    assert!(!display.contains("super-secret"), "Display leaked the key");
    assert_eq!(key.len(), "super-secret-signing-key".len());
}

/// **VALUE**: Verifies implicit serialization is refused but explicit exposure works.
///
/// **BUG THIS CATCHES**: Would catch if a struct holding a key is serialized to logs or
/// telemetry by accident, and would catch if the connection file writer loses the key.
#[test]
fn given_key_when_serialized_then_only_explicit_exposure_succeeds() {
    #[derive(Serialize)]
    struct Implicit {
        key: RedactedKey,
    }

    #[derive(Serialize)]
    struct Explicit {
        #[serde(serialize_with = "RedactedKey::serialize_exposed")]
        key: RedactedKey,
    }

    // GIVEN: The same key in both shapes
    let implicit = Implicit {
        key: RedactedKey::new("abc"),
    };
    let explicit = Explicit {
        key: RedactedKey::new("abc"),
    };

    // WHEN: Serializing both
    let implicit_result = serde_json::to_string(&implicit);
    let explicit_result = serde_json::to_string(&explicit);

    // THEN: Implicit fails, explicit carries the value
    assert!(implicit_result.is_err(), "Implicit serialization must fail");
    assert_eq!(explicit_result.unwrap(), r#"{"key":"abc"}"#);
}

/// **VALUE**: Verifies keys read back from JSON keep their value.
#[test]
fn given_json_string_when_deserialized_then_key_matches() {
    // GIVEN / WHEN: A key parsed from JSON
    let key: RedactedKey = serde_json::from_str(r#""from-disk""#).unwrap();

    // THEN: The value survives
    assert_eq!(key.as_str(), "from-disk");
    assert!(!key.is_empty());
}
