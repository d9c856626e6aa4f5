//! Redis client with retry logic.
//!
//! Thin wrapper over a multiplexed async connection that retries
//! transient failures with exponential backoff and maps connectivity
//! errors to [`StorageError::Unavailable`] so callers fail closed.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use redis::{aio::MultiplexedConnection, AsyncCommands, Client, ErrorKind, RedisError, RedisResult};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use kg_core::errors::StorageError;

use super::config::CacheConfig;

/// Backoff cap in milliseconds
const MAX_RETRY_DELAY_MS: u64 = 5000;

/// Thread-safe async Redis client with automatic retry for transient
/// failures.
#[derive(Clone)]
pub struct RedisClient {
    connection: MultiplexedConnection,
    max_retries: u32,
    retry_delay_ms: u64,
    command_timeout: Duration,
}

impl RedisClient {
    /// Connects to Redis using the given configuration, retrying the
    /// initial connection with exponential backoff
    pub async fn new(config: &CacheConfig) -> Result<Self, StorageError> {
        info!(url = %mask_url(&config.url), "connecting to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("invalid Redis URL: {}", e);
            StorageError::backend(format!("invalid Redis URL: {}", e))
        })?;

        let connection = Self::connect_with_retry(
            client,
            config.max_retries,
            config.retry_delay_ms,
            Duration::from_millis(config.connect_timeout_ms),
        )
        .await?;

        Ok(Self {
            connection,
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
            command_timeout: Duration::from_millis(config.command_timeout_ms),
        })
    }

    async fn connect_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
        connect_timeout: Duration,
    ) -> Result<MultiplexedConnection, StorageError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "connecting to Redis");

            let attempt = timeout(connect_timeout, client.get_multiplexed_async_connection())
                .await
                .unwrap_or_else(|_| Err(timeout_error()));

            match attempt {
                Ok(connection) => {
                    info!("connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        attempt = attempts,
                        max_retries, "Redis connection failed: {}. Retrying in {}ms", e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!(attempts, "Redis connection failed: {}", e);
                    return Err(StorageError::unavailable(e.to_string()));
                }
            }
        }
    }

    /// Sets a key without expiry
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            let value = value.to_string();
            Box::pin(async move { conn.set::<_, _, ()>(key, value).await })
        })
        .await
        .map_err(map_err)
    }

    /// Sets a key with a time-to-live in seconds
    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), StorageError> {
        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            let value = value.to_string();
            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
        .map_err(map_err)
    }

    /// Gets a key, returning `None` when absent or expired
    pub async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(map_err)
    }

    /// Returns true if the key exists
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.exists::<_, bool>(key).await })
        })
        .await
        .map_err(map_err)
    }

    /// Atomically increments a counter and returns the new value
    pub async fn increment(&self, key: &str) -> Result<i64, StorageError> {
        self.execute_with_retry(|mut conn| {
            let key = key.to_string();
            Box::pin(async move { conn.incr::<_, _, i64>(key, 1).await })
        })
        .await
        .map_err(map_err)
    }

    /// Verifies connectivity with a PING
    pub async fn health_check(&self) -> Result<bool, StorageError> {
        let response = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await
            .map_err(map_err)?;

        Ok(response == "PONG")
    }

    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            let outcome = timeout(self.command_timeout, operation(conn))
                .await
                .unwrap_or_else(|_| Err(timeout_error()));

            match outcome {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.max_retries && is_retriable_error(&e) => {
                    warn!(
                        attempt = attempts,
                        max_retries = self.max_retries,
                        "Redis operation failed: {}. Retrying in {}ms",
                        e,
                        delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!(attempts, "Redis operation failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}

/// Error stand-in for an elapsed command timeout; retriable like any
/// other I/O failure
fn timeout_error() -> RedisError {
    RedisError::from((ErrorKind::IoError, "operation timed out"))
}

/// Maps a Redis error to the storage error contract: connectivity
/// failures are `Unavailable` so verification fails closed.
fn map_err(error: RedisError) -> StorageError {
    if is_retriable_error(&error) || error.is_timeout() {
        StorageError::unavailable(error.to_string())
    } else {
        StorageError::backend(error.to_string())
    }
}

/// Transient errors worth retrying
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

/// Masks credentials in a Redis URL before it reaches the logs
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}
