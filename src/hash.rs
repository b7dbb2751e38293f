use crc32fast::Hasher;

pub const CRC_SEED: u32 = 0xffff_ffff;

// Make the checksum api be similiar to blake3's
pub struct Checksum(Hasher);

impl Checksum {
    pub fn new() -> Checksum {
        Checksum::with_seed(CRC_SEED)
    }

    pub fn with_seed(seed: u32) -> Checksum {
        Checksum(Hasher::new_with_initial(seed))
    }

    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    pub fn finalize(self) -> u32 {
        self.0.finalize()
    }
}

impl Default for Checksum {
    fn default() -> Self {
        Checksum::new()
    }
}

/// One-shot CRC-32 of `data` starting from `seed`.
pub fn checksum(seed: u32, data: &[u8]) -> u32 {
    let mut hash = Checksum::with_seed(seed);
    hash.update(data);
    hash.finalize()
}
