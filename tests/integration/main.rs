//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the link end to end
//! against mock adapters. All tests run on the host with no real
//! hardware required.

mod dispatch_tests;
mod link_tests;
mod mock_peripherals;
