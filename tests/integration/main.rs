//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one layer against the
//! mock host.  All tests run on the build machine with no real hardware.

mod controller_tests;
mod mock_hw;
