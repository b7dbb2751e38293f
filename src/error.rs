use thiserror::Error;

use crate::codec::CodecError;

#[derive(Error, Debug)]
pub enum PsiError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("cannot allocate a buffer of {0} bytes")]
    OutOfMemory(usize),
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("declared payload length {declared} does not match actual length {actual}")]
    LengthMismatch { declared: u64, actual: usize },
    #[error("checksum failed, declared {declared:#x} but computed {computed:#x}")]
    IntegrityFailure { declared: u32, computed: u32 },
    #[error("compression failed: {0}")]
    CompressionFailed(CodecError),
    #[error("decompression failed: {0}")]
    DecompressionFailed(CodecError),
    #[error("header {prefix:?} needs {needed} bytes but the slot holds {width}")]
    HeaderOverflow {
        prefix: &'static str,
        needed: usize,
        width: usize,
    },
}

impl PsiError {
    pub(crate) fn malformed<S: Into<String>>(reason: S) -> Self {
        PsiError::MalformedHeader(reason.into())
    }
}
