//! Durable key-value storage backing the client session and the offline queue.
//!
//! Values are opaque strings addressed by short string keys. Callers that
//! persist structured data go through [`get_json`] and [`set_json`].

mod error;
mod file;
mod keys;
mod memory;
mod store;

pub use error::StoreError;
pub use file::FileStore;
pub use keys::{
    store_root, validate_key, ACCESS_TOKEN_KEY, OFFLINE_QUEUE_KEY, REFRESH_TOKEN_KEY, STORE_DIR,
    USER_KEY,
};
pub use memory::MemoryStore;
pub use store::{get_json, set_json, KeyValueStore};
