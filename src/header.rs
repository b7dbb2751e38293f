//! Fixed width ASCII header slots.
//!
//! A slot holds a literal prefix, a numeral, the `>` terminator and then zero
//! padding up to the slot width, for example `<crc=0x1c291ca3>\0\0\0\0`.

use crate::error::PsiError;

pub const TERMINATOR: u8 = b'>';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    // Written with a 0x lead, which is optional when reading
    Hex,
}

#[derive(Debug, Clone, Copy)]
pub struct Directive {
    pub prefix: &'static str,
    pub width: usize,
    pub radix: Radix,
}

impl Directive {
    pub const fn new(prefix: &'static str, width: usize, radix: Radix) -> Self {
        Directive { prefix, width, radix }
    }

    fn field(&self, value: u64) -> String {
        match self.radix {
            Radix::Decimal => value.to_string(),
            Radix::Hex => format!("0x{:x}", value),
        }
    }

    /// Zero the slot then write the directive text at its start.
    ///
    /// The text must leave at least one zero byte behind it, a value that
    /// doesn't fit is a `HeaderOverflow` rather than a truncated numeral.
    pub fn write(&self, slot: &mut [u8], value: u64) -> Result<(), PsiError> {
        debug_assert_eq!(slot.len(), self.width);
        slot.fill(0);

        let text = format!("{}{}>", self.prefix, self.field(value));
        if text.len() >= slot.len() {
            return Err(PsiError::HeaderOverflow {
                prefix: self.prefix,
                needed: text.len() + 1,
                width: slot.len(),
            });
        }

        slot[..text.len()].copy_from_slice(text.as_bytes());
        Ok(())
    }

    pub fn read(&self, slot: &[u8]) -> Result<u64, PsiError> {
        if !slot.starts_with(self.prefix.as_bytes()) {
            return Err(PsiError::malformed(format!("expected {:?} header", self.prefix)));
        }

        let rest = &slot[self.prefix.len()..];
        let end = rest
            .iter()
            .position(|&b| b == TERMINATOR || b == 0)
            .unwrap_or(rest.len());
        let mut field = &rest[..end];

        if self.radix == Radix::Hex && (field.starts_with(b"0x") || field.starts_with(b"0X")) {
            field = &field[2..];
        }

        let radix = match self.radix {
            Radix::Decimal => 10,
            Radix::Hex => 16,
        };
        if field.is_empty() || !field.iter().all(|&b| (b as char).is_digit(radix)) {
            return Err(PsiError::malformed(format!("bad numeral in {:?} header", self.prefix)));
        }

        // Only ascii digits past this point
        let digits = std::str::from_utf8(field)
            .map_err(|_| PsiError::malformed(format!("bad numeral in {:?} header", self.prefix)))?;
        u64::from_str_radix(digits, radix).map_err(|_| {
            PsiError::malformed(format!("numeral overflow in {:?} header", self.prefix))
        })
    }
}
