//! Integration tests for the transformation layer


// Tests for the Transformation implementations
mod transformation_tests;
