use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub const STORE_DIR: [&str; 2] = [".aquadiary", "store"];

/// Current access token.
pub const ACCESS_TOKEN_KEY: &str = "token";
/// Long-lived token used for silent refresh.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// JSON summary of the authenticated user.
pub const USER_KEY: &str = "user";
/// JSON array of deferred requests, in FIFO order.
pub const OFFLINE_QUEUE_KEY: &str = "offlineQueue";

#[must_use]
pub fn store_root(data_dir: &Path) -> PathBuf {
    data_dir.join(STORE_DIR[0]).join(STORE_DIR[1])
}

/// Keys double as file names, so only a conservative alphabet is accepted.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey {
            key: key.to_owned(),
        })
    }
}
