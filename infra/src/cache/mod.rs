//! Redis connectivity: configuration and the retrying client.

pub mod config;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use config::CacheConfig;
pub use redis_client::RedisClient;
