//! ST7735 model driver: B/R/S init tables, tab-color variants and their
//! rotation-dependent addressing offsets.

use display_interface::WriteOnlyDataCommand;
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use crate::color::Pixel;
use crate::command::{DELAY_FLAG, MADCTL_MX, MADCTL_MY, MADCTL_RGB};
use crate::st77xx::St77xx;
use crate::{ColorOrder, Error, Instruction, Rotation};

/// Manufacturing variant of the panel, named after the color of the
/// protective tab on the stock Adafruit modules. Selects the init tables,
/// the addressing offsets and the physical window size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TabColor {
    /// ST7735B controller, 128x160.
    B,
    /// 1.8" green tab (offset by 2 columns, 1 row).
    Green,
    /// 1.8" red tab, 128x160, no offsets.
    Red,
    /// 1.8" black tab; RGB panel needing the MADCTL color-filter fix-up.
    Black,
    /// 1.44" green tab, 128x128.
    Green144,
    /// HalloWing: a 1.44" green tab mounted upside-down.
    Hallowing,
    /// 0.96" mini 160x80 on the ST7735R.
    Mini160x80,
    /// 0.96" mini 160x80 on the ST7735S (DollaTek-style green tab).
    SMini160x80,
}

impl TabColor {
    /// Native portrait (width, height) of the pixel window.
    fn physical_size(self) -> (u16, u16) {
        match self {
            TabColor::Green144 | TabColor::Hallowing => (128, 128),
            TabColor::Mini160x80 | TabColor::SMini160x80 => (80, 160),
            _ => (128, 160),
        }
    }

    /// (colstart, rowstart) of the window inside the controller RAM, at
    /// rotation 0.
    fn start_offsets(self) -> (u16, u16) {
        match self {
            TabColor::Green => (2, 1),
            TabColor::Green144 | TabColor::Hallowing => (2, 3),
            TabColor::Mini160x80 => (24, 0),
            TabColor::SMini160x80 => (26, 1),
            _ => (0, 0),
        }
    }
}

#[rustfmt::skip]
const B_INIT_SEQ_1: &[u8] = &[           // ST7735B init
    17,                                  // 17 commands:
    Instruction::SWRESET as u8, DELAY_FLAG,        //  software reset
      50,
    Instruction::SLPOUT as u8, DELAY_FLAG,         //  out of sleep mode
      255,                               //    255 = max (500 ms) delay
    Instruction::COLMOD as u8, 1 | DELAY_FLAG,     //  color mode: 16-bit
      0x05,
      10,
    Instruction::FRMCTR1 as u8, 3 | DELAY_FLAG,    //  frame rate control
      0x00, 0x06, 0x03,
      10,
    Instruction::MADCTL as u8, 1,                  //  row/col addressing
      0x08,
    Instruction::DISSET5 as u8, 2,                 //  display settings #5
      0x15, 0x02,
    Instruction::INVCTR as u8, 1,                  //  line inversion
      0x00,
    Instruction::PWCTR1 as u8, 2 | DELAY_FLAG,     //  GVDD = 4.7V, 1.0uA
      0x02, 0x70,
      10,
    Instruction::PWCTR2 as u8, 1,                  //  VGH = 14.7V, VGL = -7.35V
      0x05,
    Instruction::PWCTR3 as u8, 2,                  //  opamp current, boost freq
      0x01, 0x02,
    Instruction::VMCTR1 as u8, 2 | DELAY_FLAG,     //  VCOMH = 4V, VCOML = -1.1V
      0x3C, 0x38,
      10,
    Instruction::PWCTR6 as u8, 2,
      0x11, 0x15,
    Instruction::GMCTRP1 as u8, 16,                //  gamma, positive polarity
      0x09, 0x16, 0x09, 0x20,
      0x21, 0x1B, 0x13, 0x19,
      0x17, 0x15, 0x1E, 0x2B,
      0x04, 0x05, 0x02, 0x0E,
    Instruction::GMCTRN1 as u8, 16 | DELAY_FLAG,   //  gamma, negative polarity
      0x0B, 0x14, 0x08, 0x1E,
      0x22, 0x1D, 0x18, 0x1E,
      0x1B, 0x1A, 0x24, 0x2B,
      0x06, 0x06, 0x02, 0x0F,
      10,
    Instruction::CASET as u8, 4,                   //  column addr: 2..=129
      0x00, 0x02, 0x00, 0x81,
    Instruction::RASET as u8, 4,                   //  row addr: 2..=129
      0x00, 0x02, 0x00, 0x81,
    Instruction::NORON as u8, DELAY_FLAG,          //  normal display on
      10,
];

#[rustfmt::skip]
const B_INIT_SEQ_2: &[u8] = &[
    1,
    Instruction::DISPON as u8, DELAY_FLAG,         //  main screen turn on
      255,
];

#[rustfmt::skip]
const R_INIT_SEQ_1: &[u8] = &[           // ST7735R init, part 1 (all tabs)
    15,                                  // 15 commands:
    Instruction::SWRESET as u8, DELAY_FLAG,        //  software reset
      150,
    Instruction::SLPOUT as u8, DELAY_FLAG,         //  out of sleep mode
      255,
    Instruction::FRMCTR1 as u8, 3,                 //  frame rate, normal mode
      0x01, 0x2C, 0x2D,
    Instruction::FRMCTR2 as u8, 3,                 //  frame rate, idle mode
      0x01, 0x2C, 0x2D,
    Instruction::FRMCTR3 as u8, 6,                 //  frame rate, partial mode
      0x01, 0x2C, 0x2D,
      0x01, 0x2C, 0x2D,
    Instruction::INVCTR as u8, 1,                  //  no display inversion
      0x07,
    Instruction::PWCTR1 as u8, 3,                  //  -4.6V, AUTO mode
      0xA2, 0x02, 0x84,
    Instruction::PWCTR2 as u8, 1,                  //  VGH25=2.4C VGSEL=-10 VGH=3*AVDD
      0xC5,
    Instruction::PWCTR3 as u8, 2,                  //  opamp current, boost freq
      0x0A, 0x00,
    Instruction::PWCTR4 as u8, 2,                  //  BCLK/2
      0x8A, 0x2A,
    Instruction::PWCTR5 as u8, 2,
      0x8A, 0xEE,
    Instruction::VMCTR1 as u8, 1,
      0x0E,
    Instruction::INVOFF as u8, 0,                  //  don't invert display
    Instruction::MADCTL as u8, 1,                  //  row/col addr, bottom-top refresh
      0xC8,
    Instruction::COLMOD as u8, 1,                  //  color mode: 16-bit
      0x05,
];

#[rustfmt::skip]
const R_INIT_SEQ_2_GREEN: &[u8] = &[     // ST7735R init, part 2 (green tab)
    2,
    Instruction::CASET as u8, 4,                   //  column addr: 2..=129
      0x00, 0x02, 0x00, 0x81,
    Instruction::RASET as u8, 4,                   //  row addr: 1..=160
      0x00, 0x01, 0x00, 0xA0,
];

#[rustfmt::skip]
const R_INIT_SEQ_2_RED: &[u8] = &[       // ST7735R init, part 2 (red tab)
    2,
    Instruction::CASET as u8, 4,                   //  column addr: 0..=127
      0x00, 0x00, 0x00, 0x7F,
    Instruction::RASET as u8, 4,                   //  row addr: 0..=159
      0x00, 0x00, 0x00, 0x9F,
];

#[rustfmt::skip]
const R_INIT_SEQ_2_GREEN144: &[u8] = &[  // ST7735R init, part 2 (1.44" green tab)
    2,
    Instruction::CASET as u8, 4,                   //  column addr: 0..=127
      0x00, 0x00, 0x00, 0x7F,
    Instruction::RASET as u8, 4,                   //  row addr: 0..=127
      0x00, 0x00, 0x00, 0x7F,
];

#[rustfmt::skip]
const R_INIT_SEQ_2_MINI160X80: &[u8] = &[ // ST7735R init, part 2 (mini 160x80)
    2,
    Instruction::CASET as u8, 4,                   //  column addr: 0..=79
      0x00, 0x00, 0x00, 0x4F,
    Instruction::RASET as u8, 4,                   //  row addr: 0..=159
      0x00, 0x00, 0x00, 0x9F,
];

#[rustfmt::skip]
const R_INIT_SEQ_3: &[u8] = &[           // ST7735R init, part 3 (all tabs)
    3,
    Instruction::GMCTRP1 as u8, 16,                //  gamma, positive polarity
      0x02, 0x1c, 0x07, 0x12,
      0x37, 0x32, 0x29, 0x2d,
      0x29, 0x25, 0x2B, 0x39,
      0x00, 0x01, 0x03, 0x10,
    Instruction::GMCTRN1 as u8, 16,                //  gamma, negative polarity
      0x03, 0x1d, 0x07, 0x06,
      0x2E, 0x2C, 0x29, 0x2D,
      0x2E, 0x2E, 0x37, 0x3F,
      0x00, 0x00, 0x02, 0x10,
    Instruction::NORON as u8, DELAY_FLAG,          //  normal display on
      10,
];

#[rustfmt::skip]
const R_INIT_SEQ_4: &[u8] = &[
    1,
    Instruction::DISPON as u8, DELAY_FLAG,         //  main screen turn on
      100,
];

#[rustfmt::skip]
const S_INIT_SEQ_1: &[u8] = &[           // ST7735S init, part 1
    13,                                  // 13 commands:
    Instruction::SWRESET as u8, DELAY_FLAG,        //  software reset
      150,
    Instruction::SLPOUT as u8, DELAY_FLAG,         //  out of sleep mode
      255,
    Instruction::FRMCTR1 as u8, 3,                 //  frame rate, normal mode
      0x01, 0x2C, 0x2D,
    Instruction::FRMCTR2 as u8, 3,                 //  frame rate, idle mode
      0x01, 0x2C, 0x2D,
    Instruction::FRMCTR3 as u8, 6,                 //  frame rate, partial mode
      0x01, 0x2C, 0x2D,
      0x01, 0x2C, 0x2D,
    Instruction::INVCTR as u8, 1,                  //  no display inversion
      0x07,
    Instruction::PWCTR1 as u8, 3,                  //  -4.6V, AUTO mode
      0xA2, 0x02, 0x84,
    Instruction::PWCTR2 as u8, 1,
      0xC5,
    Instruction::PWCTR3 as u8, 2,                  //  opamp current, boost freq
      0x0A, 0x00,
    Instruction::PWCTR4 as u8, 2,                  //  BCLK/2
      0x8A, 0x2A,
    Instruction::PWCTR5 as u8, 2,
      0x8A, 0xEE,
    Instruction::VMCTR1 as u8, 1,
      0x0E,
    Instruction::COLMOD as u8, 1,                  //  color mode: 16-bit
      0x05,
];

const S_INIT_SEQ_2: &[u8] = R_INIT_SEQ_3;

#[rustfmt::skip]
const S_INIT_SEQ_3: &[u8] = &[
    1,
    Instruction::DISPON as u8, DELAY_FLAG,         //  main screen turn on
      100,
];

/// Driver for ST7735 panels.
///
/// ```no_run
/// # fn demo<DI, RST, D>(di: DI, rst: RST, delay: &mut D) -> Result<(), st77xx::Error<RST::Error>>
/// # where
/// #     DI: display_interface::WriteOnlyDataCommand,
/// #     RST: embedded_hal::digital::v2::OutputPin,
/// #     D: embedded_hal::blocking::delay::DelayMs<u32>,
/// # {
/// use st77xx::{ColorOrder, Pixel, Rotation, St7735, TabColor};
///
/// let mut display = St7735::new(di, Some(rst), TabColor::Green, ColorOrder::Rgb, false);
/// display.init(delay)?;
/// display.set_rotation(Rotation::Deg90)?;
/// display.fill_screen(Pixel::BLACK)?;
/// # Ok(())
/// # }
/// ```
pub struct St7735<DI, RST> {
    pub(crate) core: St77xx<DI, RST>,
    tab: TabColor,
    color_order: ColorOrder,
}

impl<DI, RST, PinE> St7735<DI, RST>
where
    DI: WriteOnlyDataCommand,
    RST: OutputPin<Error = PinE>,
{
    /// Creates the driver. Nothing is transmitted until [`init`](Self::init).
    pub fn new(
        di: DI,
        rst: Option<RST>,
        tab: TabColor,
        color_order: ColorOrder,
        reverse_inversion: bool,
    ) -> Self {
        let (width, height) = tab.physical_size();
        Self {
            core: St77xx::new(di, rst, width, height, reverse_inversion),
            tab,
            color_order,
        }
    }

    /// Resets the panel, runs the tab-specific init tables, clears the
    /// screen and applies the current rotation.
    pub fn init<D>(&mut self, delay: &mut D) -> Result<(), Error<PinE>>
    where
        D: DelayMs<u32>,
    {
        self.core.hard_reset(delay)?;
        match self.tab {
            TabColor::B => self.init_b(delay),
            TabColor::SMini160x80 => self.init_s(delay),
            _ => self.init_r(delay),
        }
    }

    fn init_b<D>(&mut self, delay: &mut D) -> Result<(), Error<PinE>>
    where
        D: DelayMs<u32>,
    {
        self.core.run_sequence(B_INIT_SEQ_1, delay)?;
        self.set_rotation(self.core.rotation)?;
        self.core.fill_screen(Pixel::BLACK)?;
        self.core.run_sequence(B_INIT_SEQ_2, delay)
    }

    fn init_r<D>(&mut self, delay: &mut D) -> Result<(), Error<PinE>>
    where
        D: DelayMs<u32>,
    {
        self.core.run_sequence(R_INIT_SEQ_1, delay)?;
        let (col, row) = self.tab.start_offsets();
        self.core.set_col_row_start(col, row);
        let seq_2 = match self.tab {
            TabColor::Green => R_INIT_SEQ_2_GREEN,
            TabColor::Green144 | TabColor::Hallowing => R_INIT_SEQ_2_GREEN144,
            TabColor::Mini160x80 => R_INIT_SEQ_2_MINI160X80,
            _ => R_INIT_SEQ_2_RED,
        };
        self.core.run_sequence(seq_2, delay)?;
        self.core.run_sequence(R_INIT_SEQ_3, delay)?;

        // Black tab and the 160x80 mini ship with an RGB color filter;
        // correct MADCTL before the rotation write.
        if matches!(self.tab, TabColor::Black | TabColor::Mini160x80) {
            self.core.write_madctl(MADCTL_MX | MADCTL_MY | MADCTL_RGB)?;
        }

        self.set_rotation(self.core.rotation)?;
        self.core.fill_screen(Pixel::BLACK)?;
        self.core.run_sequence(R_INIT_SEQ_4, delay)
    }

    fn init_s<D>(&mut self, delay: &mut D) -> Result<(), Error<PinE>>
    where
        D: DelayMs<u32>,
    {
        self.core.run_sequence(S_INIT_SEQ_1, delay)?;
        self.core.invert_display(false)?;
        let (col, row) = self.tab.start_offsets();
        self.core.set_col_row_start(col, row);
        self.core.run_sequence(S_INIT_SEQ_2, delay)?;
        self.set_rotation(self.core.rotation)?;
        self.core.fill_screen(Pixel::BLACK)?;
        self.core.run_sequence(S_INIT_SEQ_3, delay)
    }

    /// Rotates the display origin, recomputing the window size, the
    /// addressing offsets and the MADCTL byte. Idempotent.
    pub fn set_rotation(&mut self, rotation: Rotation) -> Result<(), Error<PinE>> {
        self.core.rotation = rotation;

        // The 1.44" green tab window sits 3 rows in for rotations 0 and 1,
        // 1 row in for rotations 2 and 3.
        if matches!(self.tab, TabColor::Green144 | TabColor::Hallowing) {
            self.core.rowstart = if rotation.index() < 2 { 3 } else { 1 };
        }

        let (pw, ph) = self.tab.physical_size();
        if rotation.is_swapped() {
            self.core.width = ph;
            self.core.height = pw;
            self.core.xstart = self.core.rowstart;
            self.core.ystart = self.core.colstart;
        } else {
            self.core.width = pw;
            self.core.height = ph;
            self.core.xstart = self.core.colstart;
            self.core.ystart = self.core.rowstart;
        }

        self.core
            .write_madctl(rotation.madctl_bits() | self.color_order.madctl_bits())
    }

    pub fn tab_color(&self) -> TabColor {
        self.tab
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
