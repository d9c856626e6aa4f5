//! Storage backend tests

mod memory_tests;
