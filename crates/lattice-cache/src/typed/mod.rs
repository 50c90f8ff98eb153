//! Typed caches over [`CacheLayer`](crate::CacheLayer), one per cache kind.

mod embedding;
mod entity;
mod search;

pub use embedding::EmbeddingCache;
pub use entity::EntityCache;
pub use search::{SearchKey, SearchResultCache};

use lattice_core::errors::CacheError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// blake3 hex digest, used for every content-derived key segment.
pub(crate) fn content_hash(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

pub(crate) fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CacheError> {
    serde_json::to_vec(value).map_err(|e| CacheError::Codec {
        reason: e.to_string(),
    })
}

pub(crate) fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CacheError> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Codec {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undecodable_payload_is_a_codec_error() {
        let err = decode_json::<Vec<String>>(b"{not json").unwrap_err();
        assert!(matches!(err, CacheError::Codec { .. }));
    }

    #[test]
    fn json_payload_decodes() {
        let bytes = encode_json(&["a", "b"][..]).unwrap();
        assert_eq!(decode_json::<Vec<String>>(&bytes).unwrap(), vec!["a", "b"]);
    }
}
