//! Unit tests for flotilla CLI
//!
//! These tests use stubbed ports and run fast without external I/O.

mod barrier_service;
mod bootstrap_service;
