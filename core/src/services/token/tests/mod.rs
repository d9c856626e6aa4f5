//! Token service tests
