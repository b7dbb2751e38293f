//! PSI container framing.
//!
//! ```text
//! [0, 40)      <compressed alg=lzw len=N>   zero padded
//! [40, 60)     <crc=0xHHHHHHHH>             zero padded
//! [60, 60+N)   compressed payload
//! ```
//!
//! The checksum covers the payload only, never the header slots.

use std::cmp;

use log::trace;

use crate::buf::{RawBuffer, INITIAL_CAPACITY};
use crate::codec::{Codec, CodecError, Lzw};
use crate::error::PsiError;
use crate::hash::{checksum, CRC_SEED};
use crate::header::{Directive, Radix};

pub const COMPRESSED_HEADER: &str = "<compressed alg=lzw len=";
pub const CRC_HEADER: &str = "<crc=";

pub const COMPRESSED_HEADER_LEN: usize = 40;
pub const CRC_HEADER_LEN: usize = 20;
pub const HEADER_LEN: usize = COMPRESSED_HEADER_LEN + CRC_HEADER_LEN;

const COMPRESSED_DIRECTIVE: Directive =
    Directive::new(COMPRESSED_HEADER, COMPRESSED_HEADER_LEN, Radix::Decimal);
const CRC_DIRECTIVE: Directive = Directive::new(CRC_HEADER, CRC_HEADER_LEN, Radix::Hex);

#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Starting capacity of the input buffer
    pub read_capacity: usize,
    /// Initial payload bound as a multiple of the input length
    pub encode_ratio: usize,
    /// Initial output bound as a multiple of the payload length
    pub decode_ratio: usize,
    /// Floor for either initial bound
    pub min_payload: usize,
    /// No single output buffer grows past this
    pub max_output: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        FrameConfig {
            read_capacity: INITIAL_CAPACITY,
            encode_ratio: 2,
            decode_ratio: 10,
            min_payload: 64,
            max_output: u32::MAX as usize,
        }
    }
}

impl FrameConfig {
    fn initial_bound(&self, len: usize, ratio: usize) -> usize {
        let bound = cmp::max(len.saturating_mul(ratio), self.min_payload);
        cmp::min(bound, self.max_output)
    }
}

/// A complete container, either owned (built by [`encode`]) or borrowed
/// (as validated by [`decode`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container<B = Vec<u8>> {
    bytes: B,
}

impl<B: AsRef<[u8]>> Container<B> {
    /// Wrap bytes that are at least as long as both header slots.
    ///
    /// Nothing else is checked here, see [`decode`] for validation.
    pub fn new(bytes: B) -> Result<Self, PsiError> {
        let len = bytes.as_ref().len();
        if len < HEADER_LEN {
            return Err(PsiError::malformed(format!(
                "container is {} bytes, shorter than the {} byte headers",
                len, HEADER_LEN
            )));
        }
        Ok(Container { bytes })
    }

    pub fn compression_header(&self) -> &[u8] {
        &self.bytes.as_ref()[..COMPRESSED_HEADER_LEN]
    }

    pub fn checksum_header(&self) -> &[u8] {
        &self.bytes.as_ref()[COMPRESSED_HEADER_LEN..HEADER_LEN]
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes.as_ref()[HEADER_LEN..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    pub fn len(&self) -> usize {
        self.bytes.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.as_ref().is_empty()
    }

    pub fn into_inner(self) -> B {
        self.bytes
    }
}

pub fn encode(raw: &[u8]) -> Result<Container, PsiError> {
    encode_with(&Lzw, raw, &FrameConfig::default())
}

pub fn encode_with<C: Codec>(
    codec: &C,
    raw: &[u8],
    config: &FrameConfig,
) -> Result<Container, PsiError> {
    let mut bound = config.initial_bound(raw.len(), config.encode_ratio);
    let mut buf = RawBuffer::with_capacity(framed_capacity(bound)?)?;

    // Reserve both header slots, they stay zeroed until the payload is known
    buf.advance(HEADER_LEN);

    let len = loop {
        match codec.compress(raw, buf.spare_mut()) {
            Ok(len) => break len,
            Err(CodecError::OutputFull { .. }) if bound < config.max_output => {
                bound = cmp::min(bound.saturating_mul(2), config.max_output);
                trace!("payload bound exceeded, retrying with {} bytes", bound);

                buf.spare_mut().fill(0);
                buf.grow_to(framed_capacity(bound)?)?;
            }
            Err(e) => return Err(PsiError::CompressionFailed(e)),
        }
    };
    buf.advance(len);

    let crc = checksum(CRC_SEED, &buf.as_slice()[HEADER_LEN..]);
    {
        let (compressed, rest) = buf.as_mut_slice().split_at_mut(COMPRESSED_HEADER_LEN);
        COMPRESSED_DIRECTIVE.write(compressed, len as u64)?;
        CRC_DIRECTIVE.write(&mut rest[..CRC_HEADER_LEN], u64::from(crc))?;
    }

    Container::new(buf.into_vec())
}

// Both header slots plus a payload bound
fn framed_capacity(bound: usize) -> Result<usize, PsiError> {
    HEADER_LEN
        .checked_add(bound)
        .ok_or(PsiError::OutOfMemory(usize::MAX))
}

pub fn decode(container: &[u8]) -> Result<Vec<u8>, PsiError> {
    decode_with(&Lzw, container, &FrameConfig::default())
}

/// Validate the container then decompress its payload.
///
/// Structure, declared length and checksum are all verified before the
/// payload reaches the codec.
pub fn decode_with<C: Codec>(
    codec: &C,
    container: &[u8],
    config: &FrameConfig,
) -> Result<Vec<u8>, PsiError> {
    let frame = validate(container)?;
    let payload = frame.payload();

    let mut bound = config.initial_bound(payload.len(), config.decode_ratio);
    let mut buf = RawBuffer::with_capacity(bound)?;

    let len = loop {
        match codec.decompress(payload, buf.spare_mut()) {
            Ok(len) => break len,
            Err(CodecError::OutputFull { .. }) if bound < config.max_output => {
                bound = cmp::min(bound.saturating_mul(2), config.max_output);
                trace!("decoded output exceeded bound, retrying with {} bytes", bound);

                buf.spare_mut().fill(0);
                buf.grow_to(bound)?;
            }
            Err(e) => return Err(PsiError::DecompressionFailed(e)),
        }
    };
    buf.advance(len);

    Ok(buf.into_vec())
}

/// Check both headers and the payload checksum without decompressing.
pub fn validate(container: &[u8]) -> Result<Container<&[u8]>, PsiError> {
    let frame = Container::new(container)?;
    let payload = frame.payload();

    let declared = COMPRESSED_DIRECTIVE.read(frame.compression_header())?;
    if declared != payload.len() as u64 {
        return Err(PsiError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }

    let declared = CRC_DIRECTIVE.read(frame.checksum_header())?;
    let declared = u32::try_from(declared).map_err(|_| {
        PsiError::malformed(format!("checksum {:#x} is wider than 32 bits", declared))
    })?;

    let computed = checksum(CRC_SEED, payload);
    if declared != computed {
        return Err(PsiError::IntegrityFailure { declared, computed });
    }

    Ok(frame)
}


#[cfg(test)]
mod test_frame_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn roundtrip(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let container = encode(&data).unwrap();
            prop_assert_eq!(decode(container.as_bytes()).unwrap(), data);
        }

        #[test]
        fn payload_bit_flip(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            pick in any::<usize>(),
            bit in 0u8..8,
        ) {
            let mut bytes = encode(&data).unwrap().into_inner();
            let i = HEADER_LEN + pick % (bytes.len() - HEADER_LEN);
            bytes[i] ^= 1 << bit;

            let is_integrity_failure =
                matches!(decode(&bytes), Err(PsiError::IntegrityFailure { .. }));
            prop_assert!(is_integrity_failure);
        }

        #[test]
        fn appended_bytes(
            data in proptest::collection::vec(any::<u8>(), 0..512),
            extra in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let mut bytes = encode(&data).unwrap().into_inner();
            bytes.extend_from_slice(&extra);

            let is_length_mismatch = matches!(decode(&bytes), Err(PsiError::LengthMismatch { .. }));
            prop_assert!(is_length_mismatch);
        }
    }
}
