//! Cache module tests

mod redis_client_tests;
