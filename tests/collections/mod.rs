//! Integration tests for parameter collections

// Tests for transform / untransform over collections
mod apply_tests;
