//! CSRF service and protection tests

mod service_tests;
