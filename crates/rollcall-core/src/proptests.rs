//! Property-based tests for normalization and validation.
