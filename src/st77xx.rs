//! Base driver shared by every ST77xx panel: command transmission, the
//! init-sequence executor, address-window computation and the
//! display-enable/sleep/tearing/inversion toggles.
//!
//! The model drivers ([`St7735`](crate::St7735), [`St7789`](crate::St7789))
//! own one of these and layer the vendor init tables and per-rotation
//! geometry on top.

use display_interface::{DataFormat, WriteOnlyDataCommand};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use num_traits::ToPrimitive;

use crate::color::Pixel;
use crate::command::InitSequence;
use crate::{Error, Instruction, Rotation};

/// Chunk size for bulk fills, in pixels.
const FILL_CHUNK_PIXELS: usize = 256;

/// Transport, addressing and geometry state common to all ST77xx panels.
pub struct St77xx<DI, RST> {
    di: DI,
    rst: Option<RST>,
    pub(crate) colstart: u16,
    pub(crate) rowstart: u16,
    pub(crate) colstart2: u16,
    pub(crate) rowstart2: u16,
    pub(crate) xstart: u16,
    pub(crate) ystart: u16,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) rotation: Rotation,
    invert_on: Instruction,
    invert_off: Instruction,
}

impl<DI, RST, PinE> St77xx<DI, RST>
where
    DI: WriteOnlyDataCommand,
    RST: OutputPin<Error = PinE>,
{
    /// Creates the shared driver state for a panel of the given physical
    /// size. `rst` is the optional hardware reset line; panels without one
    /// are reset in software through SWRESET during init.
    ///
    /// `reverse_inversion` swaps the meaning of the INVON/INVOFF pair for
    /// panels manufactured with inverted polarity.
    pub fn new(di: DI, rst: Option<RST>, width: u16, height: u16, reverse_inversion: bool) -> Self {
        let (invert_on, invert_off) = if reverse_inversion {
            (Instruction::INVOFF, Instruction::INVON)
        } else {
            (Instruction::INVON, Instruction::INVOFF)
        };
        Self {
            di,
            rst,
            colstart: 0,
            rowstart: 0,
            colstart2: 0,
            rowstart2: 0,
            xstart: 0,
            ystart: 0,
            width,
            height,
            rotation: Rotation::default(),
            invert_on,
            invert_off,
        }
    }

    /// Gives back the display interface and reset pin.
    pub fn release(self) -> (DI, Option<RST>) {
        (self.di, self.rst)
    }

    /// Borrows the underlying display interface.
    pub fn interface(&self) -> &DI {
        &self.di
    }

    /// Current width in pixels, accounting for rotation.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Current height in pixels, accounting for rotation.
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Pulses the reset line, holding it low for 50 ms and letting the
    /// controller settle for 150 ms afterwards. No-op without a reset pin.
    pub fn hard_reset<D>(&mut self, delay: &mut D) -> Result<(), Error<PinE>>
    where
        D: DelayMs<u32>,
    {
        if let Some(rst) = self.rst.as_mut() {
            rst.set_high().map_err(Error::Pin)?;
            delay.delay_ms(10);
            rst.set_low().map_err(Error::Pin)?;
            delay.delay_ms(50);
            rst.set_high().map_err(Error::Pin)?;
            delay.delay_ms(150);
        }
        Ok(())
    }

    /// Sends an instruction and its argument bytes over the command/data
    /// channel.
    pub fn send_command(
        &mut self,
        instruction: Instruction,
        args: &[u8],
    ) -> Result<(), Error<PinE>> {
        self.write_raw(instruction.to_u8().unwrap_or(Instruction::NOP as u8), args)
    }

    fn write_raw(&mut self, command: u8, args: &[u8]) -> Result<(), Error<PinE>> {
        self.di.send_commands(DataFormat::U8(&[command]))?;
        if !args.is_empty() {
            self.di.send_data(DataFormat::U8(args))?;
        }
        Ok(())
    }

    /// Transmits a packed init table, waiting out each command's settle
    /// time before the next command goes on the wire.
    ///
    /// The table is validated while it is walked; a malformed table aborts
    /// with [`Error::Sequence`] instead of reading out of range.
    pub fn run_sequence<D>(&mut self, table: &[u8], delay: &mut D) -> Result<(), Error<PinE>>
    where
        D: DelayMs<u32>,
    {
        for op in InitSequence::new(table)? {
            let op = op?;
            self.write_raw(op.command, op.args)?;
            if let Some(ms) = op.delay_ms {
                delay.delay_ms(ms);
            }
        }
        Ok(())
    }

    /// Overrides the column/row offset of the panel's (0,0) origin inside
    /// the controller RAM.
    pub fn set_col_row_start(&mut self, col: u16, row: u16) {
        self.colstart = col;
        self.rowstart = row;
    }

    /// Opens the address window for a `w` x `h` blit at `(x, y)` and issues
    /// RAMWR; pixel data may be streamed afterwards.
    ///
    /// Coordinates are shifted by the panel's start offsets but not
    /// clamped; the controller defines how out-of-range windows behave.
    /// Degenerate ranges (zero width, ranges past `u16::MAX`) wrap and go
    /// on the wire as their low 16 bits.
    pub fn set_addr_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), Error<PinE>> {
        let xs = x.wrapping_add(self.xstart);
        let ys = y.wrapping_add(self.ystart);
        let x0 = xs.to_be_bytes();
        let x1 = xs.wrapping_add(w).wrapping_sub(1).to_be_bytes();
        let y0 = ys.to_be_bytes();
        let y1 = ys.wrapping_add(h).wrapping_sub(1).to_be_bytes();
        self.send_command(Instruction::CASET, &[x0[0], x0[1], x1[0], x1[1]])?;
        self.send_command(Instruction::RASET, &[y0[0], y0[1], y1[0], y1[1]])?;
        self.send_command(Instruction::RAMWR, &[])
    }

    /// Turns the whole display output on or off (DISPON/DISPOFF).
    pub fn enable_display(&mut self, enable: bool) -> Result<(), Error<PinE>> {
        self.send_command(
            if enable {
                Instruction::DISPON
            } else {
                Instruction::DISPOFF
            },
            &[],
        )
    }

    /// Enters or leaves sleep mode (SLPIN/SLPOUT).
    pub fn enable_sleep(&mut self, enable: bool) -> Result<(), Error<PinE>> {
        self.send_command(
            if enable {
                Instruction::SLPIN
            } else {
                Instruction::SLPOUT
            },
            &[],
        )
    }

    /// Turns the tearing-effect output line on or off (TEON/TEOFF).
    pub fn enable_tearing(&mut self, enable: bool) -> Result<(), Error<PinE>> {
        self.send_command(
            if enable {
                Instruction::TEON
            } else {
                Instruction::TEOFF
            },
            &[],
        )
    }

    /// Inverts the panel colors, honoring a reversed inversion polarity.
    pub fn invert_display(&mut self, invert: bool) -> Result<(), Error<PinE>> {
        let instruction = if invert {
            self.invert_on
        } else {
            self.invert_off
        };
        self.send_command(instruction, &[])
    }

    /// Writes a single pixel.
    pub fn set_pixel(&mut self, x: u16, y: u16, pixel: Pixel) -> Result<(), Error<PinE>> {
        self.set_addr_window(x, y, 1, 1)?;
        self.di.send_data(DataFormat::U8(&pixel.to_be_bytes()))?;
        Ok(())
    }

    /// Streams pixels row-major into the given window.
    pub fn set_pixels<T>(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixels: T,
    ) -> Result<(), Error<PinE>>
    where
        T: IntoIterator<Item = Pixel>,
    {
        self.set_addr_window(x, y, w, h)?;
        self.di
            .send_data(DataFormat::U16BEIter(&mut pixels.into_iter().map(Pixel::raw)))?;
        Ok(())
    }

    /// Fills a `w` x `h` rectangle at `(x, y)` with one color, in chunked
    /// bulk writes.
    pub fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixel: Pixel,
    ) -> Result<(), Error<PinE>> {
        self.set_addr_window(x, y, w, h)?;
        let bytes = pixel.to_be_bytes();
        let mut chunk = [0u8; FILL_CHUNK_PIXELS * 2];
        for pair in chunk.chunks_exact_mut(2) {
            pair.copy_from_slice(&bytes);
        }
        let mut remaining = w as usize * h as usize;
        while remaining > 0 {
            let batch = remaining.min(FILL_CHUNK_PIXELS);
            self.di.send_data(DataFormat::U8(&chunk[..batch * 2]))?;
            remaining -= batch;
        }
        Ok(())
    }

    /// Fills the whole current window with one color.
    pub fn fill_screen(&mut self, pixel: Pixel) -> Result<(), Error<PinE>> {
        self.fill_rect(0, 0, self.width, self.height, pixel)
    }

    /// Sends the MADCTL byte selecting mirroring, axis swap and subpixel
    /// order.
    pub(crate) fn write_madctl(&mut self, madctl: u8) -> Result<(), Error<PinE>> {
        self.send_command(Instruction::MADCTL, &[madctl])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::DELAY_FLAG;
    use crate::testing::{NoDelay, NoPin, Op, Recorder};
    use crate::SequenceError;
    use std::vec;
    use std::vec::Vec;

    fn driver(width: u16, height: u16) -> St77xx<Recorder, NoPin> {
        St77xx::new(Recorder::new(), None, width, height, false)
    }

    #[test]
    fn addr_window_issues_caset_raset_ramwr() {
        let mut d = driver(128, 160);
        d.xstart = 2;
        d.ystart = 1;
        d.set_addr_window(10, 20, 30, 40).unwrap();
        let (di, _) = d.release();
        assert_eq!(
            di.ops,
            vec![
                Op::Command(Instruction::CASET as u8),
                // 10+2 ..= 10+2+30-1
                Op::Data(vec![0x00, 12, 0x00, 41]),
                Op::Command(Instruction::RASET as u8),
                // 20+1 ..= 20+1+40-1
                Op::Data(vec![0x00, 21, 0x00, 60]),
                Op::Command(Instruction::RAMWR as u8),
            ]
        );
    }

    #[test]
    fn addr_window_emits_big_endian_ranges_past_255() {
        let mut d = driver(240, 320);
        d.xstart = 0;
        d.ystart = 80;
        d.set_addr_window(0, 200, 240, 120).unwrap();
        let (di, _) = d.release();
        assert_eq!(di.ops[1], Op::Data(vec![0x00, 0, 0x00, 239]));
        // y range 280..=399 crosses the byte boundary
        assert_eq!(di.ops[3], Op::Data(vec![0x01, 0x18, 0x01, 0x8F]));
    }

    #[test]
    fn addr_window_zero_width_wraps_instead_of_panicking() {
        let mut d = driver(128, 160);
        d.set_addr_window(0, 0, 0, 1).unwrap();
        let (di, _) = d.release();
        // The empty range wraps to 0..=0xFFFF; the controller clamps it.
        assert_eq!(di.ops[1], Op::Data(vec![0x00, 0x00, 0xFF, 0xFF]));
        assert_eq!(di.ops[3], Op::Data(vec![0x00, 0x00, 0x00, 0x00]));
    }

    #[test]
    fn addr_window_past_u16_max_sends_the_low_bytes() {
        let mut d = driver(240, 320);
        d.set_addr_window(u16::MAX, 0xFFF0, 1, 0x20).unwrap();
        let (di, _) = d.release();
        assert_eq!(di.ops[1], Op::Data(vec![0xFF, 0xFF, 0xFF, 0xFF]));
        // 0xFFF0 + 0x20 - 1 wraps to 0x000F.
        assert_eq!(di.ops[3], Op::Data(vec![0xFF, 0xF0, 0x00, 0x0F]));
    }

    #[test]
    fn run_sequence_transmits_all_commands() {
        #[rustfmt::skip]
        let table = [
            2,
            Instruction::SWRESET as u8, DELAY_FLAG, 150,
            Instruction::COLMOD as u8, 1, 0x05,
        ];
        let mut d = driver(128, 160);
        d.run_sequence(&table, &mut NoDelay).unwrap();
        let (di, _) = d.release();
        assert_eq!(
            di.ops,
            vec![
                Op::Command(Instruction::SWRESET as u8),
                Op::Command(Instruction::COLMOD as u8),
                Op::Data(vec![0x05]),
            ]
        );
    }

    #[test]
    fn run_sequence_rejects_malformed_tables() {
        // Declares 4 argument bytes, carries 1.
        let table = [1, Instruction::CASET as u8, 4, 0x00];
        let mut d = driver(128, 160);
        assert!(matches!(
            d.run_sequence(&table, &mut NoDelay),
            Err(Error::Sequence(SequenceError::UnexpectedEnd))
        ));
    }

    #[test]
    fn toggles_send_the_paired_instructions() {
        let mut d = driver(128, 160);
        d.enable_display(true).unwrap();
        d.enable_display(false).unwrap();
        d.enable_sleep(true).unwrap();
        d.enable_sleep(false).unwrap();
        d.enable_tearing(true).unwrap();
        d.enable_tearing(false).unwrap();
        d.invert_display(true).unwrap();
        d.invert_display(false).unwrap();
        let (di, _) = d.release();
        let commands: Vec<u8> = di
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Command(c) => Some(*c),
                Op::Data(_) => None,
            })
            .collect();
        assert_eq!(
            commands,
            vec![0x29, 0x28, 0x10, 0x11, 0x35, 0x34, 0x21, 0x20]
        );
    }

    #[test]
    fn reversed_inversion_polarity_swaps_invon_invoff() {
        let mut d: St77xx<Recorder, NoPin> = St77xx::new(Recorder::new(), None, 128, 160, true);
        d.invert_display(true).unwrap();
        d.invert_display(false).unwrap();
        let (di, _) = d.release();
        assert_eq!(
            di.ops,
            vec![
                Op::Command(Instruction::INVOFF as u8),
                Op::Command(Instruction::INVON as u8),
            ]
        );
    }

    #[test]
    fn fill_rect_writes_every_pixel_once() {
        let mut d = driver(128, 160);
        d.fill_rect(0, 0, 100, 7, Pixel::from(0xf800)).unwrap();
        let (di, _) = d.release();
        let data_len: usize = di
            .ops
            .iter()
            .skip(5) // CASET/RASET/RAMWR preamble
            .map(|op| match op {
                Op::Data(d) => d.len(),
                Op::Command(_) => 0,
            })
            .sum();
        assert_eq!(data_len, 100 * 7 * 2);
        // Every data chunk after the preamble repeats the pixel bytes.
        for op in di.ops.iter().skip(5) {
            if let Op::Data(bytes) = op {
                for pair in bytes.chunks_exact(2) {
                    assert_eq!(pair, [0xf8, 0x00]);
                }
            }
        }
    }

    #[test]
    fn set_pixels_streams_big_endian_words() {
        let mut d = driver(128, 160);
        d.set_pixels(0, 0, 2, 1, [Pixel::from(0x1234), Pixel::from(0xabcd)])
            .unwrap();
        let (di, _) = d.release();
        assert_eq!(
            di.ops.last(),
            Some(&Op::Data(vec![0x12, 0x34, 0xab, 0xcd]))
        );
    }
}
