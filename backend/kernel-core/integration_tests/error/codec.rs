use kernel_core::error::codec::CodecError;
use kernel_core::wire::MessageCodec;

use bytes::Bytes;

/// **VALUE**: Verifies that decode errors carry the location where they were raised.
///
/// **WHY THIS MATTERS**: Decode errors are logged and skipped, so the log line is the
/// only trace of a malformed message. It has to say which check rejected it.
///
/// **BUG THIS CATCHES**: Would catch `#[track_caller]` being dropped from the frame
/// checks, which would point every decode error at the same helper line.
#[test]
fn given_malformed_frames_when_decoded_then_error_includes_location() {
    // GIVEN: Frames with no delimiter
    let frames = vec![Bytes::from_static(b"garbage")];

    // WHEN: Decoding
    let err = MessageCodec::decode(frames).unwrap_err();

    // THEN: Display carries the kind, the reason and a source location
    let text = err.to_string();
    assert!(text.contains("Decode Error"), "{text}");
    assert!(text.contains("delimiter"), "{text}");
    assert!(text.contains(".rs:"), "{text}");
    assert!(err.is_per_message());
}

/// **VALUE**: Verifies sign errors are fatal, not per-message.
#[test]
fn given_sign_error_when_classified_then_not_per_message() {
    let err = CodecError::sign("backend unavailable");

    assert!(!err.is_per_message());
    assert!(err.to_string().contains("backend unavailable"));
}
