//! Integration tests for dependency resolution and scheduling
//!
//! These tests drive the library API end to end: rule registration, graph
//! construction, staleness, and the worker pool.
