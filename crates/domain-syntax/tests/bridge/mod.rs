//! Prefix-notation and JSON bridge tests
