use std::cmp;
use std::io::{ErrorKind, Read};

use log::trace;

use crate::error::PsiError;

pub const INITIAL_CAPACITY: usize = 1024;

// Fills as much of buf as the reader can give, returns (eof, filled)
pub fn fill_buf<R: Read>(data: &mut R, buf: &mut [u8]) -> std::io::Result<(bool, usize)> {
    let mut buf_read = 0;

    while buf_read < buf.len() {
        match data.read(&mut buf[buf_read..]) {
            Ok(0) => return Ok((true, buf_read)),
            Ok(x) => buf_read += x,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
    }
    Ok((false, buf_read))
}

/// Owned, zero initialized byte buffer.
///
/// The whole capacity is allocated and zeroed up front so the spare region can
/// be handed out as a plain `&mut [u8]`; `len` tracks how much of it holds data.
#[derive(Debug)]
pub struct RawBuffer {
    buf: Vec<u8>,
    len: usize,
}

impl RawBuffer {
    pub fn with_capacity(capacity: usize) -> Result<Self, PsiError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|_| PsiError::OutOfMemory(capacity))?;
        buf.resize(capacity, 0);

        Ok(RawBuffer { buf, len: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.buf[..self.len]
    }

    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.len..]
    }

    // Marks n more bytes of the spare region as filled
    pub fn advance(&mut self, n: usize) {
        assert!(n <= self.buf.len() - self.len, "advance past capacity");
        self.len += n;
    }

    /// Grow the buffer to exactly `capacity` bytes, keeping the filled data.
    pub fn grow_to(&mut self, capacity: usize) -> Result<(), PsiError> {
        if capacity <= self.buf.len() {
            return Ok(());
        }

        self.buf
            .try_reserve_exact(capacity - self.buf.len())
            .map_err(|_| PsiError::OutOfMemory(capacity))?;
        self.buf.resize(capacity, 0);

        trace!("buffer grown to {} bytes", capacity);
        Ok(())
    }

    pub fn grow(&mut self) -> Result<(), PsiError> {
        let capacity = cmp::max(self.buf.len(), 1)
            .checked_mul(2)
            .ok_or(PsiError::OutOfMemory(usize::MAX))?;
        self.grow_to(capacity)
    }

    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.len);
        self.buf
    }
}

/// Read the whole stream, doubling the buffer each time a read fills it.
///
/// The source is left open.
pub fn read_all<R: Read>(source: &mut R) -> Result<RawBuffer, PsiError> {
    read_all_with(source, INITIAL_CAPACITY)
}

pub fn read_all_with<R: Read>(source: &mut R, capacity: usize) -> Result<RawBuffer, PsiError> {
    let mut buf = RawBuffer::with_capacity(capacity)?;

    loop {
        let (eof, len) = fill_buf(source, buf.spare_mut())?;
        buf.advance(len);

        if eof {
            break;
        }
        buf.grow()?;
    }

    trace!("read {} bytes into a {} byte buffer", buf.len(), buf.capacity());
    Ok(buf)
}

#[cfg(test)]
mod test_fill_buf {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn big_buf_small_vec() {
        let mut in_buf: Cursor<Vec<u8>> = Cursor::new(vec![1, 2]);
        let mut buf: [u8; 4] = [0; 4];

        assert_eq!(fill_buf(&mut in_buf, &mut buf).unwrap(), (true, 2));
        assert_eq!(&buf, &[1, 2, 0, 0]);
    }

    #[test]
    fn small_buf_big_vec() {
        let mut in_buf: Cursor<Vec<u8>> = Cursor::new(vec![1, 2, 3, 4]);
        let mut buf: [u8; 2] = [0; 2];

        assert_eq!(fill_buf(&mut in_buf, &mut buf).unwrap(), (false, 2));
        assert_eq!(&buf, &[1, 2]);
    }

    #[test]
    fn same_buf_same_vec() {
        let mut in_buf: Cursor<Vec<u8>> = Cursor::new(vec![1, 2, 3, 4]);
        let mut buf: [u8; 4] = [0; 4];

        assert_eq!(fill_buf(&mut in_buf, &mut buf).unwrap(), (false, 4));
        assert_eq!(&buf, &[1, 2, 3, 4]);
    }

    // Hands out one byte per call and interrupts every other call
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        interrupt: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(std::io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            if self.pos == self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn short_and_interrupted_reads() {
        let mut in_buf = Trickle {
            data: vec![1, 2, 3],
            pos: 0,
            interrupt: false,
        };
        let mut buf: [u8; 4] = [0; 4];

        assert_eq!(fill_buf(&mut in_buf, &mut buf).unwrap(), (true, 3));
        assert_eq!(&buf, &[1, 2, 3, 0]);
    }
}
