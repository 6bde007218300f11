//! Redis service for cached lookups

use redis::{AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service
    pub async fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let service = Self { client };
        service.ping().await?;
        Ok(service)
    }

    /// Check the connection
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.get_connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;
        Ok(())
    }

    /// Read a JSON value; a value that no longer parses is treated as absent
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.get_connection().await?;
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read {} from Redis: {}", key, e)))?;

        Ok(raw.and_then(|s| match serde_json::from_str(&s) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }))
    }

    /// Store a JSON value with expiration (in seconds)
    pub async fn set_json_ex<T: Serialize>(&self, key: &str, value: &T, expiration_seconds: u64) -> AppResult<()> {
        let payload = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Failed to serialize cache entry: {}", e)))?;

        let mut conn = self.get_connection().await?;
        conn.set_ex::<_, _, ()>(key, payload, expiration_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store {} in Redis: {}", key, e)))?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.get_connection().await?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to delete {} from Redis: {}", key, e)))?;
        Ok(())
    }

    /// Get a Redis connection (for advanced operations)
    pub async fn get_connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}
