//! Shared proptest generators.
//!
//! Reusable generators for the request/response shapes recorded by the
//! ledger, shared by the pact unit properties and the integration suite.

use pact_ledger::{HeaderValue, Headers, MockResponse, RecordedRequest, SpecVersion};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Generate provider names.
pub fn provider_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("todo-service".to_string()),
        Just("user-service".to_string()),
        Just("billing-service".to_string()),
        Just("search-service".to_string()),
    ]
}

/// Generate supported specification versions.
pub fn spec_version_strategy() -> impl Strategy<Value = SpecVersion> {
    prop_oneof![
        Just(SpecVersion::V2),
        Just(SpecVersion::V3),
        Just(SpecVersion::V4),
    ]
}

/// Generate HTTP methods.
pub fn http_method_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GET".to_string()),
        Just("POST".to_string()),
        Just("PUT".to_string()),
        Just("PATCH".to_string()),
        Just("DELETE".to_string()),
    ]
}

/// Generate absolute request paths.
pub fn path_strategy() -> impl Strategy<Value = String> {
    vec("[a-z][a-z0-9-]{0,8}", 1..4).prop_map(|segments| format!("/{}", segments.join("/")))
}

/// Generate interaction descriptions.
pub fn description_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,10}( [a-z]{2,10}){0,3}"
}

/// Generate HTTP status codes.
pub fn status_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(200_u16),
        Just(201),
        Just(204),
        Just(400),
        Just(404),
        Just(500),
    ]
}

/// Generate header maps with lowercase names.
pub fn headers_strategy() -> impl Strategy<Value = Headers> {
    btree_map(
        prop_oneof![
            Just("accept".to_string()),
            Just("authorization".to_string()),
            Just("content-type".to_string()),
            Just("x-request-id".to_string()),
            "x-[a-z]{3,8}",
        ],
        "[A-Za-z0-9/=;. -]{1,24}".prop_map(HeaderValue::Single),
        0..4,
    )
}

/// Generate JSON bodies: scalars, arrays and objects nested a few levels.
pub fn json_body_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(Value::Array),
            btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Generate recorded requests.
pub fn recorded_request_strategy() -> impl Strategy<Value = RecordedRequest> {
    (
        http_method_strategy(),
        path_strategy(),
        proptest::option::of("[a-z]{1,6}=[a-z0-9]{1,6}"),
        headers_strategy(),
        proptest::option::of(json_body_strategy()),
    )
        .prop_map(|(method, path, query, headers, body)| RecordedRequest {
            method,
            path,
            query,
            headers: (!headers.is_empty()).then_some(headers),
            body,
        })
}

/// Generate mock responses.
pub fn mock_response_strategy() -> impl Strategy<Value = MockResponse> {
    (status_strategy(), proptest::option::of(json_body_strategy())).prop_map(|(status, body)| {
        MockResponse {
            status,
            headers: None,
            body,
        }
    })
}
