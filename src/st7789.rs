//! ST7789 model driver: generic init table and per-size addressing offsets
//! inside the controller's 240x320 RAM.

use display_interface::WriteOnlyDataCommand;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use crate::color::Pixel;
use crate::command::DELAY_FLAG;
use crate::st77xx::St77xx;
use crate::{ColorOrder, Error, Instruction, Rotation};

/// Controller RAM dimensions; every supported window is carved out of this.
const RAM_WIDTH: u16 = 240;
const RAM_HEIGHT: u16 = 320;

#[rustfmt::skip]
const GENERIC_INIT_SEQ_1: &[u8] = &[     // ST7789 init, part 1
    3,
    Instruction::SWRESET as u8, DELAY_FLAG,        //  software reset
      150,
    Instruction::SLPOUT as u8, DELAY_FLAG,         //  out of sleep mode
      10,
    Instruction::COLMOD as u8, 1 | DELAY_FLAG,     //  color mode: 16-bit
      0x55,
      10,
];

#[rustfmt::skip]
const GENERIC_INIT_SEQ_2: &[u8] = &[     // ST7789 init, part 2
    2,
    Instruction::NORON as u8, DELAY_FLAG,          //  normal display on
      10,
    Instruction::DISPON as u8, DELAY_FLAG,         //  main screen turn on
      10,
];

/// Driver for ST7789 panels of any window size up to 240x320.
///
/// The window is positioned inside the controller RAM the way the stock
/// modules wire it: 240x240 panels sit right-justified, the 1.14" 135x240
/// panel is centered with its odd spare pixel on the rotation-0 side, and
/// everything else is centered.
pub struct St7789<DI, RST> {
    pub(crate) core: St77xx<DI, RST>,
    window_width: u16,
    window_height: u16,
    color_order: ColorOrder,
}

impl<DI, RST, PinE> St7789<DI, RST>
where
    DI: WriteOnlyDataCommand,
    RST: OutputPin<Error = PinE>,
{
    /// Creates the driver for a `width` x `height` window. Nothing is
    /// transmitted until [`init`](Self::init).
    pub fn new(
        di: DI,
        rst: Option<RST>,
        width: u16,
        height: u16,
        color_order: ColorOrder,
        reverse_inversion: bool,
    ) -> Self {
        Self {
            core: St77xx::new(di, rst, width, height, reverse_inversion),
            window_width: width,
            window_height: height,
            color_order,
        }
    }

    /// Resets the panel, derives the RAM offsets for the window size, runs
    /// the init tables, clears the screen and applies the current rotation.
    pub fn init<D>(&mut self, delay: &mut D) -> Result<(), Error<PinE>>
    where
        D: DelayMs<u32>,
    {
        let (width, height) = (self.window_width, self.window_height);
        if width == 240 && height == 240 {
            // 1.3" and 1.54" displays, right justified in RAM.
            self.core.rowstart = RAM_HEIGHT - height;
            self.core.rowstart2 = 0;
            self.core.colstart = RAM_WIDTH - width;
            self.core.colstart2 = RAM_WIDTH - width;
        } else if width == 135 && height == 240 {
            // 1.14" display, centered with an odd column count; the spare
            // pixel must land in colstart, not colstart2.
            self.core.rowstart = (RAM_HEIGHT - height) / 2;
            self.core.rowstart2 = self.core.rowstart;
            self.core.colstart = (RAM_WIDTH - width + 1) / 2;
            self.core.colstart2 = (RAM_WIDTH - width) / 2;
        } else {
            // 1.47", 1.69", 1.9", 2.0" displays, centered.
            self.core.rowstart = (RAM_HEIGHT - height) / 2;
            self.core.rowstart2 = self.core.rowstart;
            self.core.colstart = (RAM_WIDTH - width) / 2;
            self.core.colstart2 = self.core.colstart;
        }

        self.core.hard_reset(delay)?;
        self.core.run_sequence(GENERIC_INIT_SEQ_1, delay)?;
        self.core.invert_display(false)?;
        self.set_rotation(self.core.rotation)?;
        self.core.fill_screen(Pixel::BLACK)?;
        self.core.run_sequence(GENERIC_INIT_SEQ_2, delay)
    }

    /// Rotates the display origin, recomputing the window size, the RAM
    /// offsets and the MADCTL byte. Idempotent.
    ///
    /// The secondary offsets come into play here: rotations 1 and 2 address
    /// the window from the far corner of the RAM, so they use
    /// colstart2/rowstart2 instead of the rotation-0 offsets.
    pub fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Error<PinE>> {
        self.core.rotation = rotation;

        match rotation {
            Rotation::Deg0 => {
                self.core.xstart = self.core.colstart;
                self.core.ystart = self.core.rowstart;
            }
            Rotation::Deg90 => {
                self.core.xstart = self.core.rowstart;
                self.core.ystart = self.core.colstart2;
            }
            Rotation::Deg180 => {
                self.core.xstart = self.core.colstart2;
                self.core.ystart = self.core.rowstart2;
            }
            Rotation::Deg270 => {
                self.core.xstart = self.core.rowstart2;
                self.core.ystart = self.core.colstart;
            }
        }
        if rotation.is_swapped() {
            self.core.width = self.window_height;
            self.core.height = self.window_width;
        } else {
            self.core.width = self.window_width;
            self.core.height = self.window_height;
        }

        self.core
            .write_madctl(rotation.madctl_bits() | self.color_order.madctl_bits())
    }

    pub fn rotation(&self) -> Rotation {
        self.core.rotation()
    }

    pub fn width(&self) -> u16 {
        self.core.width()
    }

    pub fn height(&self) -> u16 {
        self.core.height()
    }

    pub fn hard_reset<D>(&mut self, delay: &mut D) -> Result<(), Error<PinE>>
    where
        D: DelayMs<u32>,
    {
        self.core.hard_reset(delay)
    }

    pub fn set_addr_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), Error<PinE>> {
        self.core.set_addr_window(x, y, w, h)
    }

    pub fn set_col_row_start(&mut self, col: u16, row: u16) {
        self.core.set_col_row_start(col, row)
    }

    pub fn enable_display(&mut self, enable: bool) -> Result<(), Error<PinE>> {
        self.core.enable_display(enable)
    }

    pub fn enable_sleep(&mut self, enable: bool) -> Result<(), Error<PinE>> {
        self.core.enable_sleep(enable)
    }

    pub fn enable_tearing(&mut self, enable: bool) -> Result<(), Error<PinE>> {
        self.core.enable_tearing(enable)
    }

    pub fn invert_display(&mut self, invert: bool) -> Result<(), Error<PinE>> {
        self.core.invert_display(invert)
    }

    pub fn set_pixel(&mut self, x: u16, y: u16, pixel: Pixel) -> Result<(), Error<PinE>> {
        self.core.set_pixel(x, y, pixel)
    }

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
        self.core.set_pixels(x, y, w, h, pixels)
    }

    pub fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
        pixel: Pixel,
    ) -> Result<(), Error<PinE>> {
        self.core.fill_rect(x, y, w, h, pixel)
    }

    pub fn fill_screen(&mut self, pixel: Pixel) -> Result<(), Error<PinE>> {
        self.core.fill_screen(pixel)
    }

    /// Gives back the display interface and reset pin.
    pub fn release(self) -> (DI, Option<RST>) {
        self.core.release()
    }
}
