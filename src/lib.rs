//! PSI containers: an LZW payload framed by two fixed width ASCII headers,
//! one declaring the algorithm and payload length, one carrying a CRC-32 of
//! the payload.

pub mod buf;
pub mod cli;
pub mod cmd;
pub mod codec;
pub mod error;
pub mod frame;
pub mod hash;
pub mod header;

pub use crate::error::PsiError;
pub use crate::frame::{decode, encode, validate, Container, FrameConfig};
