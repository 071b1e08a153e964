//! Key/value persistence layer for the medirec offline runtime.
//!
//! Defines the [`StorageService`] contract every runtime provides and its
//! two implementations:
//! - [`NativeStorage`]: one JSON document per key on the local disk,
//!   used by the desktop runtime
//! - [`WebStorage`]: an in-process map standing in for the browser
//!   origin store
//!
//! Contract semantics: reads are best-effort cache reads and degrade to
//! `None` on any failure; writes propagate their errors. Values round-trip
//! structurally (a saved `0` comes back as `0`, not as a missing key).

mod error;
mod native;
mod web;

pub use error::{StorageError, StorageResult};
pub use native::NativeStorage;
pub use web::WebStorage;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Abstract key/value persistence interface.
///
/// Keys are independent: there is no cross-key transaction. Concurrent
/// saves to the same key are last-write-wins.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Returns the name of the storage implementation.
    fn name(&self) -> &'static str;

    /// Reads a value. Missing keys and internal read failures both yield
    /// `None`; failures are logged, never propagated.
    async fn get(&self, key: &str) -> Option<Value>;

    /// Writes a value. Failures (quota, I/O) propagate to the caller.
    async fn save(&self, key: &str, value: &Value) -> StorageResult<()>;

    /// Removes a key. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Removes every key.
    async fn clear(&self) -> StorageResult<()>;

    /// Lists all stored keys, in no particular order.
    async fn keys(&self) -> StorageResult<Vec<String>>;
}

impl dyn StorageService {
    /// Typed read. Decode failures degrade to `None` like raw read failures.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!(key, error = %e, "stored value failed to decode, treating as missing");
                None
            }
        }
    }

    /// Typed write.
    pub async fn save_as<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let value = serde_json::to_value(value)?;
        self.save(key, &value).await
    }
}
