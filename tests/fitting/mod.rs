//! Integration tests for the fitting loop

mod fit_tests;
