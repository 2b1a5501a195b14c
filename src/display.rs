use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::*,
};
use embedded_text::{
    TextBox,
    alignment::HorizontalAlignment,
    style::{HeightMode, TextBoxStyleBuilder},
};

use crate::config::DeviceConfiguration;

/// Top-left corner of the text area.
const TEXT_ORIGIN: Point = Point::new(4, 4);

/// Colour scheme of the screen. E-paper panels map `On` to white.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Day,
    Night,
}

impl Palette {
    /// Night palette during the configured night window, day otherwise.
    pub fn for_hour(config: &DeviceConfiguration<'_>, hour: Option<u8>) -> Self {
        match hour {
            Some(hour) if config.is_night(hour) => Palette::Night,
            _ => Palette::Day,
        }
    }

    pub fn background(&self) -> BinaryColor {
        match self {
            Palette::Day => BinaryColor::On,
            Palette::Night => BinaryColor::Off,
        }
    }

    pub fn foreground(&self) -> BinaryColor {
        self.background().invert()
    }
}

/// Draw `text` onto the frame buffer using the given palette.
pub fn draw_text<D>(text: &str, palette: Palette, buffer: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
    D::Error: core::fmt::Debug,
{
    // clear display first
    if let Err(e) = buffer.clear(palette.background()) {
        log::error!("Failed to clear display buffer: {:?}", e);
        return Err(e);
    }

    // text style: monospace 6x10
    let character_style = MonoTextStyle::new(&FONT_6X10, palette.foreground());
    let textbox_style = TextBoxStyleBuilder::new()
        .height_mode(HeightMode::FitToText)
        .alignment(HorizontalAlignment::Left)
        .paragraph_spacing(2)
        .build();

    // height 0 lets FitToText compute required height
    let width = buffer.bounding_box().size.width.saturating_sub(TEXT_ORIGIN.x as u32 * 2);
    let bounds = embedded_graphics::primitives::Rectangle::new(TEXT_ORIGIN, Size::new(width, 0));
    let text_box = TextBox::with_textbox_style(text, bounds, character_style, textbox_style);

    if let Err(e) = text_box.draw(buffer) {
        log::error!("Failed to draw text to display buffer: {:?}", e);
        return Err(e);
    }

    log::info!("Show on display: \n{}", text);
    Ok(())
}
