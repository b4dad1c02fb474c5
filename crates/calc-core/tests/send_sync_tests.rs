//! Tests to verify that public types shared across tasks are Send + Sync.

use calc_core::diagnostics::FanoutSink;
use calc_core::*;

const fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_domain_types_are_send_sync() {
    assert_send_sync::<PluginName>();
    assert_send_sync::<Digit>();
    assert_send_sync::<Operator>();
}

#[test]
fn test_config_types_are_send_sync() {
    assert_send_sync::<ClientConfig>();
    assert_send_sync::<RetryPolicy>();
}

#[test]
fn test_sinks_are_send_sync() {
    assert_send_sync::<MemorySink>();
    assert_send_sync::<TracingSink>();
    assert_send_sync::<FanoutSink>();
    assert_send_sync::<std::sync::Arc<dyn DiagnosticSink>>();
}

#[test]
fn test_error_is_send_sync() {
    assert_send_sync::<Error>();
}
