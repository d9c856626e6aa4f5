//! Networked storage backends.

pub mod redis_storage;

pub use redis_storage::RedisTokenStorage;
