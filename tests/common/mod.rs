//! Common test utilities for graph-batch

pub mod fixtures;

pub use fixtures::{BatchResponder, StepOutcome, service_config};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}
