use thiserror::Error;
use weezl::decode::Decoder;
use weezl::encode::Encoder;
use weezl::{BitOrder, BufferResult, LzwStatus};

// Byte oriented alphabet, codes grow from 9 up to 12 bits
const LZW_SYMBOL_SIZE: u8 = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("output exceeds the {capacity} byte buffer")]
    OutputFull { capacity: usize },
    #[error("{0}")]
    Engine(String),
}

// Trait for wrapping up the compression/decompression engine
//
// Both directions write only inside `out` and return how many bytes were
// written, an engine that runs out of room must report OutputFull.
pub trait Codec {
    fn compress(&self, input: &[u8], out: &mut [u8]) -> Result<usize, CodecError>;
    fn decompress(&self, input: &[u8], out: &mut [u8]) -> Result<usize, CodecError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Lzw;

impl Codec for Lzw {
    fn compress(&self, input: &[u8], out: &mut [u8]) -> Result<usize, CodecError> {
        let mut encoder = Encoder::new(BitOrder::Msb, LZW_SYMBOL_SIZE);
        encoder.finish();

        drive(input, out, |inp, out| encoder.encode_bytes(inp, out))
    }

    fn decompress(&self, input: &[u8], out: &mut [u8]) -> Result<usize, CodecError> {
        let mut decoder = Decoder::new(BitOrder::Msb, LZW_SYMBOL_SIZE);

        drive(input, out, |inp, out| decoder.decode_bytes(inp, out))
    }
}

// Pump a weezl coder until it reports Done, or until it stops making progress
fn drive<F>(input: &[u8], out: &mut [u8], mut step: F) -> Result<usize, CodecError>
where
    F: FnMut(&[u8], &mut [u8]) -> BufferResult,
{
    let mut consumed = 0;
    let mut written = 0;

    loop {
        let res = step(&input[consumed..], &mut out[written..]);
        consumed += res.consumed_in;
        written += res.consumed_out;

        match res.status {
            Ok(LzwStatus::Done) => return Ok(written),
            Ok(_) if res.consumed_in == 0 && res.consumed_out == 0 => {
                if written == out.len() {
                    return Err(CodecError::OutputFull { capacity: out.len() });
                }
                return Err(CodecError::Engine("stream ended without an end code".to_string()));
            }
            Ok(_) => (),
            Err(e) => return Err(CodecError::Engine(e.to_string())),
        }
    }
}
