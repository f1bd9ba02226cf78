use crate::error::NativeError;
use crate::wire::{
    EventFrame, InboundFrame, RequestFrame, ResponseFrame, ResponseOutcome, decode_binary,
    encode_binary,
};

use serde_json::{Value, json};

fn response(data: Value) -> ResponseFrame {
    ResponseFrame {
        id: "id-1".to_string(),
        data,
    }
}

#[test]
fn given_request_when_encoded_then_uses_wire_field_names() {
    // GIVEN: A request with a payload
    let data = json!({ "title": "Hi" });
    let frame = RequestFrame {
        id: "abc",
        method: "window.setTitle",
        data: &data,
        access_token: "tok",
    };

    // WHEN: Encoding it
    let encoded: Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();

    // THEN: Field names match what the native side reads
    assert_eq!(
        encoded,
        json!({ "id": "abc", "method": "window.setTitle", "data": { "title": "Hi" }, "accessToken": "tok" })
    );
}

/// **VALUE**: Calls without a payload omit `data` instead of sending `null`.
///
/// **BUG THIS CATCHES**: Would catch `"data": null` reaching native handlers that
/// index into the payload object.
#[test]
fn given_null_payload_when_encoded_then_data_field_is_omitted() {
    let frame = RequestFrame {
        id: "abc",
        method: "app.getConfig",
        data: &Value::Null,
        access_token: "tok",
    };

    let encoded: Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();

    assert!(encoded.get("data").is_none(), "{encoded}");
}

/// **VALUE**: A frame with an `id` is a response; a frame with only `event` is an event.
///
/// **WHY THIS MATTERS**: Routing a response to the event dispatcher would leave its
/// caller waiting forever.
#[test]
fn given_inbound_text_when_parsed_then_frames_are_classified() {
    let response = InboundFrame::parse(r#"{"id":"x","data":{"success":true}}"#).unwrap();
    let event = InboundFrame::parse(r#"{"event":"windowClose","data":null}"#).unwrap();

    assert!(matches!(response, InboundFrame::Response(ResponseFrame { ref id, .. }) if id == "x"));
    assert!(matches!(event, InboundFrame::Event(EventFrame { ref event, .. }) if event == "windowClose"));
}

#[test]
fn given_garbage_when_parsed_then_returns_error() {
    assert!(InboundFrame::parse("not json").is_err());
    assert!(InboundFrame::parse(r#"{"unrelated": 1}"#).is_err());
}

#[test]
fn given_success_with_return_value_when_classified_then_yields_return_value() {
    let outcome = response(json!({ "success": true, "returnValue": [1, 2] })).outcome();

    assert_eq!(outcome, ResponseOutcome::Success(json!([1, 2])));
}

/// **VALUE**: Success without `returnValue` resolves with the whole data object.
///
/// **BUG THIS CATCHES**: Would catch resolving with `null` and losing fields such as
/// `message` that some native methods return beside `success`.
#[test]
fn given_success_without_return_value_when_classified_then_yields_whole_data() {
    let data = json!({ "success": true, "message": "done" });

    let outcome = response(data.clone()).outcome();

    assert_eq!(outcome, ResponseOutcome::Success(data));
}

#[test]
fn given_error_object_when_classified_then_yields_native_error() {
    let outcome = response(json!({
        "success": false,
        "error": { "code": "NE_FS_NOPATHE", "message": "No such file" }
    }))
    .outcome();

    assert_eq!(
        outcome,
        ResponseOutcome::Failure(NativeError {
            code: "NE_FS_NOPATHE".to_string(),
            message: "No such file".to_string(),
        })
    );
}

/// **VALUE**: An error wins even if `success` claims otherwise.
#[test]
fn given_error_and_success_flag_when_classified_then_error_wins() {
    let outcome = response(json!({ "success": true, "error": { "code": "E", "message": "m" } }))
        .outcome();

    assert!(matches!(outcome, ResponseOutcome::Failure(_)));
}

/// **VALUE**: Neither success nor error is surfaced as malformed, never as success.
///
/// **BUG THIS CATCHES**: Would catch treating a missing `success` flag as truthy.
#[test]
fn given_neither_success_nor_error_when_classified_then_malformed() {
    let outcome = response(json!({ "returnValue": 5 })).outcome();

    assert_eq!(outcome, ResponseOutcome::Malformed(json!({ "returnValue": 5 })));
}

#[test]
fn given_bytes_when_encoded_then_standard_base64_is_produced() {
    assert_eq!(encode_binary(&[0, 255, 16]), "AP8Q");
    assert_eq!(decode_binary("AP8Q").unwrap(), vec![0, 255, 16]);
    assert!(decode_binary("***").is_err());
}
