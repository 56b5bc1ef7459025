//! Pass-through converter for collections without a typed decoder.

use super::StateConverter;
use crate::models::StateDocument;
use crate::Result;

/// Wraps the raw state payload into a document without interpreting it.
///
/// The entity key is the normalized state path (lowercase, no `0x`), which
/// keeps re-application of the same slot idempotent.
pub struct RawStateConverter;

impl RawStateConverter {
    fn normalize_key(address: &str) -> String {
        address
            .strip_prefix("0x")
            .unwrap_or(address)
            .to_lowercase()
    }
}

impl StateConverter for RawStateConverter {
    fn convert(&self, raw_state: &[u8], block_index: i64, address: &str) -> Result<StateDocument> {
        let key = Self::normalize_key(address);

        Ok(StateDocument {
            address: format!("0x{key}"),
            key,
            block_index,
            body: serde_json::json!({ "raw": hex::encode(raw_state) }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_stable_key_from_path() {
        let converter = RawStateConverter;

        let a = converter.convert(b"du1:a", 5, "0xAB12cd").unwrap();
        let b = converter.convert(b"du1:a", 5, "ab12CD").unwrap();

        assert_eq!(a.key, "ab12cd");
        assert_eq!(a.key, b.key);
        assert_eq!(a.address, "0xab12cd");
    }

    #[test]
    fn body_carries_hex_payload() {
        let converter = RawStateConverter;
        let document = converter.convert(&[0xde, 0xad], 1, "00ff").unwrap();
        assert_eq!(document.body, serde_json::json!({ "raw": "dead" }));
        assert_eq!(document.block_index, 1);
    }

    #[test]
    fn same_input_converts_identically() {
        let converter = RawStateConverter;
        let a = converter.convert(b"state", 10, "0x01").unwrap();
        let b = converter.convert(b"state", 10, "0x01").unwrap();
        assert_eq!(a, b);
    }
}
