//! `embedded-graphics` binding: both model drivers are `DrawTarget`s for
//! RGB565, so lines, shapes, text and images come from the
//! embedded-graphics ecosystem instead of driver-local primitives.

use display_interface::WriteOnlyDataCommand;
use embedded_graphics_core::pixelcolor::Rgb565;
use embedded_graphics_core::prelude::*;
use embedded_graphics_core::primitives::Rectangle;
use embedded_graphics_core::Pixel as EgPixel;
use embedded_hal::digital::v2::OutputPin;

use crate::color::Pixel;
use crate::st77xx::St77xx;
use crate::{Error, St7735, St7789};

impl<DI, RST, PinE> St77xx<DI, RST>
where
    DI: WriteOnlyDataCommand,
    RST: OutputPin<Error = PinE>,
{
    fn bounds(&self) -> Rectangle {
        Rectangle::new(
            Point::zero(),
            Size::new(self.width() as u32, self.height() as u32),
        )
    }

    fn eg_draw_iter<I>(&mut self, pixels: I) -> Result<(), Error<PinE>>
    where
        I: IntoIterator<Item = EgPixel<Rgb565>>,
    {
        let bounds = self.bounds();
        for EgPixel(point, color) in pixels {
            if bounds.contains(point) {
                self.set_pixel(
                    point.x as u16,
                    point.y as u16,
                    Pixel::from(color.into_storage()),
                )?;
            }
        }
        Ok(())
    }

    fn eg_fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Error<PinE>>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        let bounds = self.bounds();
        let clipped = area.intersection(&bounds);
        if clipped.size.width == 0 || clipped.size.height == 0 {
            return Ok(());
        }
        if clipped == *area {
            return self.set_pixels(
                area.top_left.x as u16,
                area.top_left.y as u16,
                area.size.width as u16,
                area.size.height as u16,
                colors
                    .into_iter()
                    .map(|color| Pixel::from(color.into_storage())),
            );
        }
        // Partially off screen: walk the area row-major and draw the
        // visible pixels one by one.
        let mut colors = colors.into_iter();
        for dy in 0..area.size.height as i32 {
            for dx in 0..area.size.width as i32 {
                let color = match colors.next() {
                    Some(color) => color,
                    None => return Ok(()),
                };
                let point = area.top_left + Point::new(dx, dy);
                if bounds.contains(point) {
                    self.set_pixel(
                        point.x as u16,
                        point.y as u16,
                        Pixel::from(color.into_storage()),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn eg_fill_solid(&mut self, area: &Rectangle, color: Rgb565) -> Result<(), Error<PinE>> {
        let clipped = area.intersection(&self.bounds());
        if clipped.size.width == 0 || clipped.size.height == 0 {
            return Ok(());
        }
        self.fill_rect(
            clipped.top_left.x as u16,
            clipped.top_left.y as u16,
            clipped.size.width as u16,
            clipped.size.height as u16,
            Pixel::from(color.into_storage()),
        )
    }
}

impl<DI, RST, PinE> OriginDimensions for St7735<DI, RST>
where
    DI: WriteOnlyDataCommand,
    RST: OutputPin<Error = PinE>,
{
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl<DI, RST, PinE> DrawTarget for St7735<DI, RST>
where
    DI: WriteOnlyDataCommand,
    RST: OutputPin<Error = PinE>,
{
    type Color = Rgb565;
    type Error = Error<PinE>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = EgPixel<Rgb565>>,
    {
        self.core.eg_draw_iter(pixels)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.core.eg_fill_contiguous(area, colors)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.core.eg_fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.core.fill_screen(Pixel::from(color.into_storage()))
    }
}

impl<DI, RST, PinE> OriginDimensions for St7789<DI, RST>
where
    DI: WriteOnlyDataCommand,
    RST: OutputPin<Error = PinE>,
{
    fn size(&self) -> Size {
        Size::new(self.width() as u32, self.height() as u32)
    }
}

impl<DI, RST, PinE> DrawTarget for St7789<DI, RST>
where
    DI: WriteOnlyDataCommand,
    RST: OutputPin<Error = PinE>,
{
    type Color = Rgb565;
    type Error = Error<PinE>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = EgPixel<Rgb565>>,
    {
        self.core.eg_draw_iter(pixels)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.core.eg_fill_contiguous(area, colors)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.core.eg_fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.core.fill_screen(Pixel::from(color.into_storage()))
    }
}
