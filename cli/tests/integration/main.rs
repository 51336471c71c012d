//! Integration tests for flotilla CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior over a
//! filesystem-backed object store. They are slower and should be run
//! separately from unit tests.

mod cli_tests;
mod fleet_run;
