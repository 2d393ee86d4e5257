//! Test doubles: a recording display interface and no-op pin/delay
//! implementations, so the command streams the drivers emit can be
//! asserted on the host.

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use std::vec::Vec;

/// One recorded transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// A single command byte.
    Command(u8),
    /// A data transfer, flattened to bytes as they would appear on the wire.
    Data(Vec<u8>),
}

/// A `WriteOnlyDataCommand` that records everything it is asked to send.
#[derive(Default)]
pub struct Recorder {
    pub ops: Vec<Op>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded command bytes, in order, ignoring data transfers.
    pub fn commands(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Command(c) => Some(*c),
                Op::Data(_) => None,
            })
            .collect()
    }

    /// The data bytes sent immediately after the given command, if any.
    pub fn args_of(&self, command: u8) -> Option<Vec<u8>> {
        let at = self.ops.iter().rposition(|op| *op == Op::Command(command))?;
        match self.ops.get(at + 1) {
            Some(Op::Data(bytes)) => Some(bytes.clone()),
            _ => None,
        }
    }

    fn flatten(buf: DataFormat<'_>) -> Result<Vec<u8>, DisplayError> {
        match buf {
            DataFormat::U8(slice) => Ok(slice.to_vec()),
            DataFormat::U8Iter(iter) => Ok(iter.collect()),
            DataFormat::U16BEIter(iter) => {
                Ok(iter.flat_map(|word| word.to_be_bytes()).collect())
            }
            _ => Err(DisplayError::DataFormatNotImplemented),
        }
    }
}

impl WriteOnlyDataCommand for Recorder {
    fn send_commands(&mut self, cmds: DataFormat<'_>) -> Result<(), DisplayError> {
        for byte in Self::flatten(cmds)? {
            self.ops.push(Op::Command(byte));
        }
        Ok(())
    }

    fn send_data(&mut self, buf: DataFormat<'_>) -> Result<(), DisplayError> {
        let bytes = Self::flatten(buf)?;
        self.ops.push(Op::Data(bytes));
        Ok(())
    }
}

/// A delay provider that returns immediately.
pub struct NoDelay;

impl DelayMs<u32> for NoDelay {
    fn delay_ms(&mut self, _ms: u32) {}
}

/// An output pin that goes nowhere; stands in for an unwired reset line.
pub struct NoPin;

impl OutputPin for NoPin {
    type Error = core::convert::Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
