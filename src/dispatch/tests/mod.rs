//! Unit tests for worker dispatch.
