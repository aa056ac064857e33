//! Custom assertion helpers for form tests.

use jsonform_controller::FormController;

use crate::transport::StubTransport;

/// Asserts that the result sink holds exactly `expected`.
///
/// # Panics
///
/// Panics if the result sink is missing or holds something else.
pub fn assert_result_eq(controller: &FormController, expected: &str) {
    let actual = controller
        .result_text()
        .expect("result sink should be bound and present");
    assert_eq!(actual, expected, "unexpected result sink content");
}

/// Asserts that the result sink contains `needle`.
///
/// # Panics
///
/// Panics if the result sink is missing or does not contain `needle`.
pub fn assert_result_contains(controller: &FormController, needle: &str) {
    let actual = controller
        .result_text()
        .expect("result sink should be bound and present");
    assert!(
        actual.contains(needle),
        "expected result sink to contain {needle:?}, got {actual:?}"
    );
}

/// Asserts that no request was sent.
///
/// # Panics
///
/// Panics if the transport recorded any request.
pub fn assert_no_requests(transport: &StubTransport) {
    let lines = transport.request_lines();
    assert!(lines.is_empty(), "expected no requests, got {lines:?}");
}

/// Asserts that exactly `expected` requests were sent, in order, as `METHOD url`.
///
/// # Panics
///
/// Panics if the recorded requests differ.
pub fn assert_requests(transport: &StubTransport, expected: &[&str]) {
    let lines = transport.request_lines();
    assert_eq!(lines, expected, "unexpected request sequence");
}
