//! Atrium cache system.
//!
//! Two independent layers:
//!
//! - **Content store**: one [`CacheStore`] per content kind, owned by its
//!   resolution service, holding validated configurations for a fixed TTL.
//! - **Response cache**: rendered responses of the public content route,
//!   tagged `<kind>-<locale>` and invalidated by the revalidation webhook.

mod config;
mod lock;
mod middleware;
mod response;
mod store;

pub use config::CacheConfig;
pub use middleware::{CACHE_STATUS_HEADER, response_cache_layer};
pub use response::{CacheDirective, CacheStoreError, CachedResponse, ResponseCache};
pub use store::{CacheEntry, CacheStore};
