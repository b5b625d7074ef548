//! Unit tests for the field task context.
