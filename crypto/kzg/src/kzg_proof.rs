use crate::BYTES_PER_PROOF;

#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub struct KzgProof(pub [u8; BYTES_PER_PROOF]);

impl KzgProof {
    /// The compressed point at infinity, which is a valid proof for an all-zero blob.
    pub fn empty() -> Self {
        let mut bytes = [0; BYTES_PER_PROOF];
        bytes[0] = 0xc0;
        Self(bytes)
    }
}

impl Default for KzgProof {
    fn default() -> Self {
        KzgProof([0; BYTES_PER_PROOF])
    }
}

impl_g1_point_bytes!(KzgProof, BYTES_PER_PROOF);
