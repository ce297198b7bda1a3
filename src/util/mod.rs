//! Helpers shared by the binary and the test suite

pub mod install;
pub mod testing;
