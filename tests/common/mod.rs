//! Common utilities for integration tests

pub mod mock_simulation;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_simulation::{Fault, RampSimulation};
pub use test_helpers::{
    assert_one_second_steps,
    read_recording,
    relative_error,
    signals,
};
