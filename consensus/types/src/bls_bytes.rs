//! Serialized BLS points which are carried around but never decompressed.
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tree_hash::{PackedEncoding, TreeHash, TreeHashType};

pub const PUBLIC_KEY_BYTES_LEN: usize = 48;
pub const SIGNATURE_BYTES_LEN: usize = 96;

macro_rules! bytes_struct {
    ($name: ident, $byte_size: expr, $small_name: expr) => {
        #[doc = "Stores `"]
        #[doc = $small_name]
        #[doc = "` bytes which may or may not represent a valid BLS point."]
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name([u8; $byte_size]);

        impl $name {
            /// Instantiates `Self` with all-zeros.
            pub const fn empty() -> Self {
                Self([0; $byte_size])
            }

            pub fn as_serialized(&self) -> &[u8] {
                &self.0
            }

            /// Instantiates `Self` from bytes. Only the byte-length is checked.
            pub fn deserialize(bytes: &[u8]) -> Result<Self, String> {
                let array: [u8; $byte_size] = bytes.try_into().map_err(|_| {
                    format!(
                        "InvalidByteLength: got {}, expected {}",
                        bytes.len(),
                        $byte_size
                    )
                })?;
                Ok(Self(array))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::empty()
            }
        }

        impl From<[u8; $byte_size]> for $name {
            fn from(bytes: [u8; $byte_size]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", serde_utils::hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", serde_utils::hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = serde_utils::hex::decode(s)?;
                Self::deserialize(&bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let string = String::deserialize(deserializer)?;
                Self::from_str(&string).map_err(serde::de::Error::custom)
            }
        }

        impl TreeHash for $name {
            fn tree_hash_type() -> TreeHashType {
                TreeHashType::Vector
            }

            fn tree_hash_packed_encoding(&self) -> PackedEncoding {
                unreachable!("Vector should never be packed.")
            }

            fn tree_hash_packing_factor() -> usize {
                unreachable!("Vector should never be packed.")
            }

            fn tree_hash_root(&self) -> tree_hash::Hash256 {
                let minimum_chunk_count = ($byte_size + 31) / 32;
                tree_hash::merkle_root(&self.0, minimum_chunk_count)
            }
        }
    };
}

bytes_struct!(PublicKeyBytes, PUBLIC_KEY_BYTES_LEN, "48");
bytes_struct!(SignatureBytes, SIGNATURE_BYTES_LEN, "96");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pubkey_round_trips_through_hex() {
        let pubkey = PublicKeyBytes::empty();
        let json = serde_json::to_string(&pubkey).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "00".repeat(PUBLIC_KEY_BYTES_LEN)));
        assert_eq!(serde_json::from_str::<PublicKeyBytes>(&json).unwrap(), pubkey);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(SignatureBytes::from_str(&format!("0x{}", "11".repeat(48))).is_err());
        assert!(PublicKeyBytes::deserialize(&[0; 47]).is_err());
    }

    #[test]
    fn tree_hash_root_is_chunked_merkle_root() {
        let signature = SignatureBytes::from([1; SIGNATURE_BYTES_LEN]);
        assert_eq!(
            signature.tree_hash_root(),
            tree_hash::merkle_root(&[1; SIGNATURE_BYTES_LEN], 3)
        );
        assert_ne!(
            PublicKeyBytes::empty().tree_hash_root(),
            tree_hash::Hash256::zero(),
            "two zero chunks hash to a non-zero root"
        );
    }
}
