//! Shared helpers for unit tests

pub mod trace_capture;
