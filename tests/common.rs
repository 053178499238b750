#![allow(dead_code)]

use std::time::Duration;

use sluice::Dynamic;

/// Fails the test instead of hanging when a pipeline never closes
pub const DEADLINE: Duration = Duration::from_secs(5);

pub fn mixed_values() -> Vec<Dynamic> {
    vec![
        Box::new(1i64) as Dynamic,
        Box::new("one".to_string()) as Dynamic,
        Box::new(2i64) as Dynamic,
        Box::new("two".to_string()) as Dynamic,
        Box::new(3i64) as Dynamic,
    ]
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
