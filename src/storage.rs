//! JSON values in browser LocalStorage
//!
//! Native builds have no storage: reads find nothing and writes are dropped.

use serde::Serialize;
use serde::de::DeserializeOwned;

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Read and decode `key`. Unreadable values are logged and treated as absent.
#[cfg(target_arch = "wasm32")]
pub fn read<T: DeserializeOwned>(key: &str) -> Option<T> {
    let json = local_storage()?.get_item(key).ok().flatten()?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring stored {key}: {e}");
            None
        }
    }
}

/// Encode and store `value` under `key`; false if nothing was written
#[cfg(target_arch = "wasm32")]
pub fn write<T: Serialize>(key: &str, value: &T) -> bool {
    let Some(storage) = local_storage() else {
        return false;
    };
    match serde_json::to_string(value) {
        Ok(json) => storage.set_item(key, &json).is_ok(),
        Err(e) => {
            log::warn!("Could not encode {key}: {e}");
            false
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn read<T: DeserializeOwned>(_key: &str) -> Option<T> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn write<T: Serialize>(_key: &str, _value: &T) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_storage_is_empty() {
        assert_eq!(read::<u32>("anything"), None);
        assert!(!write("anything", &1u32));
    }
}
