//! ST77xx command set and the packed init-sequence format.
//!
//! Init sequences are stored the way the vendor example code ships them: a
//! flat byte table with a leading command count, then per command the opcode,
//! an argument count whose high bit ([`DELAY_FLAG`]) marks a trailing
//! post-command delay byte, the argument bytes, and optionally that delay
//! byte. A delay byte of `0xFF` stands for the protocol-maximum settle time
//! of 500 ms.
//!
//! Unlike the vendor code, [`InitSequence`] validates the table while
//! walking it: a table that would read past its end or that carries stray
//! bytes after the declared command count is reported as a
//! [`SequenceError`] instead of being sliced out of range.

use num_derive::{FromPrimitive, ToPrimitive};

/// High bit of the argument-count byte: a one-byte delay follows the args.
pub const DELAY_FLAG: u8 = 0x80;

/// Delay value meaning "wait the protocol maximum".
pub const MAX_DELAY_SENTINEL: u8 = 0xFF;

/// The protocol-maximum settle time, in milliseconds.
pub const MAX_DELAY_MS: u32 = 500;

/// MADCTL row address order (bottom to top).
pub const MADCTL_MY: u8 = 0x80;
/// MADCTL column address order (right to left).
pub const MADCTL_MX: u8 = 0x40;
/// MADCTL row/column exchange.
pub const MADCTL_MV: u8 = 0x20;
/// MADCTL vertical refresh order.
pub const MADCTL_ML: u8 = 0x10;
/// MADCTL BGR subpixel order.
pub const MADCTL_BGR: u8 = 0x08;
/// MADCTL horizontal refresh order.
pub const MADCTL_MH: u8 = 0x04;
/// MADCTL RGB subpixel order (no bit set).
pub const MADCTL_RGB: u8 = 0x00;

/// ST77xx instruction set.
#[allow(clippy::upper_case_acronyms)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Instruction {
    NOP = 0x00,
    SWRESET = 0x01,
    RDDID = 0x04,
    RDDST = 0x09,
    SLPIN = 0x10,
    SLPOUT = 0x11,
    PTLON = 0x12,
    NORON = 0x13,
    INVOFF = 0x20,
    INVON = 0x21,
    DISPOFF = 0x28,
    DISPON = 0x29,
    CASET = 0x2A,
    RASET = 0x2B,
    RAMWR = 0x2C,
    RAMRD = 0x2E,
    PTLAR = 0x30,
    TEOFF = 0x34,
    TEON = 0x35,
    MADCTL = 0x36,
    COLMOD = 0x3A,
    FRMCTR1 = 0xB1,
    FRMCTR2 = 0xB2,
    FRMCTR3 = 0xB3,
    INVCTR = 0xB4,
    DISSET5 = 0xB6,
    PWCTR1 = 0xC0,
    PWCTR2 = 0xC1,
    PWCTR3 = 0xC2,
    PWCTR4 = 0xC3,
    PWCTR5 = 0xC4,
    VMCTR1 = 0xC5,
    RDID1 = 0xDA,
    RDID2 = 0xDB,
    RDID3 = 0xDC,
    RDID4 = 0xDD,
    GMCTRP1 = 0xE0,
    GMCTRN1 = 0xE1,
    PWCTR6 = 0xFC,
}

/// A packed init table failed structural validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    /// The table ended in the middle of a command record (missing opcode,
    /// argument-count byte, argument bytes or delay byte).
    UnexpectedEnd,
    /// Bytes remain after the declared number of commands.
    TrailingBytes(usize),
}

/// One decoded command of a packed init table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SequenceOp<'a> {
    /// Raw command opcode.
    pub command: u8,
    /// Argument bytes following the opcode.
    pub args: &'a [u8],
    /// Settle time to wait before the next command, if any.
    pub delay_ms: Option<u32>,
}

/// Bounds-checked iterator over a packed init table.
pub struct InitSequence<'a> {
    bytes: &'a [u8],
    remaining: u8,
    failed: bool,
}

impl<'a> InitSequence<'a> {
    pub fn new(table: &'a [u8]) -> Result<Self, SequenceError> {
        let (&remaining, bytes) = table.split_first().ok_or(SequenceError::UnexpectedEnd)?;
        Ok(Self {
            bytes,
            remaining,
            failed: false,
        })
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], SequenceError> {
        if n > self.bytes.len() {
            return Err(SequenceError::UnexpectedEnd);
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    fn take_byte(&mut self) -> Result<u8, SequenceError> {
        Ok(self.take(1)?[0])
    }

    fn next_op(&mut self) -> Result<SequenceOp<'a>, SequenceError> {
        let command = self.take_byte()?;
        let raw_count = self.take_byte()?;
        let args = self.take((raw_count & !DELAY_FLAG) as usize)?;
        let delay_ms = if raw_count & DELAY_FLAG != 0 {
            Some(match self.take_byte()? {
                MAX_DELAY_SENTINEL => MAX_DELAY_MS,
                ms => ms as u32,
            })
        } else {
            None
        };
        Ok(SequenceOp {
            command,
            args,
            delay_ms,
        })
    }
}

impl<'a> Iterator for InitSequence<'a> {
    type Item = Result<SequenceOp<'a>, SequenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.remaining == 0 {
            if !self.bytes.is_empty() {
                self.failed = true;
                return Some(Err(SequenceError::TrailingBytes(self.bytes.len())));
            }
            return None;
        }
        self.remaining -= 1;
        let op = self.next_op();
        if op.is_err() {
            self.failed = true;
        }
        Some(op)
    }
}

/// Walks a whole table, returning the number of commands it holds.
///
/// Used by the built-in-table self-checks; the executor performs the same
/// validation incrementally while transmitting.
pub fn validate_sequence(table: &[u8]) -> Result<usize, SequenceError> {
    let mut commands = 0;
    for op in InitSequence::new(table)? {
        op?;
        commands += 1;
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    const SWRESET: u8 = Instruction::SWRESET as u8;
    const COLMOD: u8 = Instruction::COLMOD as u8;
    const NORON: u8 = Instruction::NORON as u8;

    #[test]
    fn decodes_commands_args_and_delays() {
        #[rustfmt::skip]
        let table = [
            3,
            SWRESET, DELAY_FLAG, 150,
            COLMOD, 1 | DELAY_FLAG, 0x05, 10,
            NORON, 0,
        ];
        let ops: Vec<_> = InitSequence::new(&table)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            ops,
            [
                SequenceOp {
                    command: SWRESET,
                    args: &[],
                    delay_ms: Some(150),
                },
                SequenceOp {
                    command: COLMOD,
                    args: &[0x05],
                    delay_ms: Some(10),
                },
                SequenceOp {
                    command: NORON,
                    args: &[],
                    delay_ms: None,
                },
            ]
        );
    }

    #[test]
    fn max_delay_sentinel_maps_to_500ms() {
        let table = [1, SWRESET, DELAY_FLAG, 0xFF];
        let op = InitSequence::new(&table).unwrap().next().unwrap().unwrap();
        assert_eq!(op.delay_ms, Some(500));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(
            InitSequence::new(&[]),
            Err(SequenceError::UnexpectedEnd)
        ));
    }

    #[test]
    fn truncated_arguments_are_rejected() {
        // Declares 2 argument bytes but carries only 1.
        let table = [1, COLMOD, 2, 0x05];
        assert_eq!(
            validate_sequence(&table),
            Err(SequenceError::UnexpectedEnd)
        );
    }

    #[test]
    fn missing_delay_byte_is_rejected() {
        let table = [1, SWRESET, DELAY_FLAG];
        assert_eq!(
            validate_sequence(&table),
            Err(SequenceError::UnexpectedEnd)
        );
    }

    #[test]
    fn missing_command_record_is_rejected() {
        // Declares 2 commands but holds 1.
        let table = [2, NORON, 0];
        assert_eq!(
            validate_sequence(&table),
            Err(SequenceError::UnexpectedEnd)
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let table = [1, NORON, 0, 0xAB, 0xCD];
        assert_eq!(
            validate_sequence(&table),
            Err(SequenceError::TrailingBytes(2))
        );
    }

    #[test]
    fn iterator_stops_after_an_error() {
        let table = [2, COLMOD, 4, 0x05];
        let mut seq = InitSequence::new(&table).unwrap();
        assert!(seq.next().unwrap().is_err());
        assert!(seq.next().is_none());
    }
}
