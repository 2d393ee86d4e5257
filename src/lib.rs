#![no_std]

//! This crate provides drivers for TFT displays using the ST7735 and ST7789
//! family of controllers.
//!
//! The drivers talk to the panel through a [`display_interface::WriteOnlyDataCommand`],
//! so any SPI (or parallel) interface built with `display-interface-spi` and an
//! `embedded-hal` implementation works. The crate handles the vendor init
//! command sequences, the per-panel addressing offsets, and the rotation
//! dependent memory-access-control (MADCTL) setup; pixel data is written
//! through a plain blit API or, with the `graphics` feature, through an
//! [`embedded-graphics-core`](embedded_graphics_core) `DrawTarget`.
//!
//! Supported panels:
//! * ST7735 B, R (green/red/black tab, 1.44" green tab, HalloWing,
//!   0.96" 160x80 mini) and S (160x80 mini) variants
//! * ST7789 at any window size carved out of the 240x320 controller RAM
//!   (240x240, 135x240, 240x320, ...)

#[cfg(test)]
extern crate std;

pub mod color;
pub mod command;
pub mod st7735;
pub mod st7789;
pub mod st77xx;

#[cfg(feature = "graphics")]
mod graphics;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::color::{Color, Pixel};
pub use crate::command::{Instruction, SequenceError};
pub use crate::st7735::{St7735, TabColor};
pub use crate::st7789::St7789;
pub use crate::st77xx::St77xx;

use crate::command::{MADCTL_BGR, MADCTL_MV, MADCTL_MX, MADCTL_MY, MADCTL_RGB};
use display_interface::DisplayError;

/// Error returned by all display operations.
#[derive(Debug)]
pub enum Error<PinE> {
    /// The underlying display interface rejected a transfer.
    Display(DisplayError),
    /// The reset pin could not be driven.
    Pin(PinE),
    /// A packed init table failed structural validation.
    Sequence(SequenceError),
}

impl<PinE> From<DisplayError> for Error<PinE> {
    fn from(e: DisplayError) -> Self {
        Error::Display(e)
    }
}

impl<PinE> From<SequenceError> for Error<PinE> {
    fn from(e: SequenceError) -> Self {
        Error::Sequence(e)
    }
}

/// Display rotation, clockwise from the panel's native portrait
/// orientation in 90 degree steps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation index 0..=3, matching the vendor convention.
    pub fn index(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// Odd rotations swap the panel's width and height.
    pub fn is_swapped(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Mirror/swap bits of the MADCTL byte for this rotation.
    pub(crate) fn madctl_bits(self) -> u8 {
        match self {
            Rotation::Deg0 => MADCTL_MX | MADCTL_MY,
            Rotation::Deg90 => MADCTL_MY | MADCTL_MV,
            Rotation::Deg180 => 0,
            Rotation::Deg270 => MADCTL_MX | MADCTL_MV,
        }
    }
}

/// Subpixel order of the panel.
///
/// Most ST77xx modules are wired RGB; some clones need [`ColorOrder::Bgr`]
/// to keep red and blue from swapping.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorOrder {
    #[default]
    Rgb,
    Bgr,
}

impl ColorOrder {
    pub(crate) fn madctl_bits(self) -> u8 {
        match self {
            ColorOrder::Rgb => MADCTL_RGB,
            ColorOrder::Bgr => MADCTL_BGR,
        }
    }
}

/// Controller family selector, for configuration layers that pick the
/// driver from a string (config files, CLI flags).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    St7735B,
    St7735R,
    St7735S,
    St7789,
}

/// A panel selector string did not name a supported controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownVariantError;

impl core::str::FromStr for Variant {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("st7735") || s.eq_ignore_ascii_case("st7735r") {
            Ok(Variant::St7735R)
        } else if s.eq_ignore_ascii_case("st7735b") {
            Ok(Variant::St7735B)
        } else if s.eq_ignore_ascii_case("st7735s") {
            Ok(Variant::St7735S)
        } else if s.eq_ignore_ascii_case("st7789") {
            Ok(Variant::St7789)
        } else {
            Err(UnknownVariantError)
        }
    }
}
