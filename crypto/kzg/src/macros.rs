/// Implements the byte conversions, `0x`-hex formatting, serde and tree hashing shared by the
/// compressed G1 points (`KzgCommitment`, `KzgProof`).
macro_rules! impl_g1_point_bytes {
    ($type: ident, $byte_size: expr) => {
        impl $type {
            pub fn as_bytes(&self) -> &[u8; $byte_size] {
                &self.0
            }
        }

        impl From<[u8; $byte_size]> for $type {
            fn from(bytes: [u8; $byte_size]) -> Self {
                Self(bytes)
            }
        }

        impl From<$type> for [u8; $byte_size] {
            fn from(point: $type) -> [u8; $byte_size] {
                point.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", serde_utils::hex::encode(self.0))
            }
        }

        impl std::fmt::Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", serde_utils::hex::encode(self.0))
            }
        }

        impl std::str::FromStr for $type {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let stripped = s
                    .strip_prefix("0x")
                    .ok_or_else(|| "must start with 0x".to_string())?;
                let bytes = hex::decode(stripped).map_err(|e| e.to_string())?;
                let array: [u8; $byte_size] = bytes.as_slice().try_into().map_err(|_| {
                    format!(
                        "InvalidByteLength: got {}, expected {}",
                        bytes.len(),
                        $byte_size
                    )
                })?;
                Ok(Self(array))
            }
        }

        impl serde::ser::Serialize for $type {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::ser::Serializer,
            {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> serde::de::Deserialize<'de> for $type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::de::Deserializer<'de>,
            {
                let string = <String as serde::de::Deserialize>::deserialize(deserializer)?;
                string.parse().map_err(serde::de::Error::custom)
            }
        }

        impl tree_hash::TreeHash for $type {
            fn tree_hash_type() -> tree_hash::TreeHashType {
                tree_hash::TreeHashType::Vector
            }

            fn tree_hash_packed_encoding(&self) -> tree_hash::PackedEncoding {
                unreachable!("Vector should never be packed.")
            }

            fn tree_hash_packing_factor() -> usize {
                unreachable!("Vector should never be packed.")
            }

            fn tree_hash_root(&self) -> tree_hash::Hash256 {
                tree_hash::merkle_root(&self.0, 2)
            }
        }
    };
}
