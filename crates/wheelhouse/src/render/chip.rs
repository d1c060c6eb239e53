use super::{Bitmap, RenderError, rounded_rect, set_source_color};
use crate::style::{HexColor, StyleConfig};
use cairo::{Context, FontSlant, FontWeight, Format, ImageSurface};
use std::borrow::Cow;
use wheelcore::LayoutParams;

pub const LABEL_FONT_FAMILY: &str = "Sans";

/// Everything needed to draw one label chip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChipStyle {
    pub font_size: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub corner_radius: f64,
    pub text_color: HexColor,
    pub background: HexColor,
}

impl ChipStyle {
    pub fn new(params: &LayoutParams, style: &StyleConfig) -> Self {
        Self {
            font_size: params.font_size,
            padding_x: params.label_padding_x,
            padding_y: params.label_padding_y,
            corner_radius: params.corner_radius,
            text_color: style.label_text,
            background: style.label_background,
        }
    }

    /// Chip height. The font size stands in for the glyph height, so the
    /// result does not depend on the text.
    pub fn height(&self) -> f64 {
        self.font_size + 2.0 * self.padding_y
    }
}

fn select_font(cr: &Context, style: &ChipStyle) {
    cr.select_font_face(LABEL_FONT_FAMILY, FontSlant::Normal, FontWeight::Normal);
    cr.set_font_size(style.font_size);
}

/// Cairo takes C strings; interior NULs are dropped.
fn printable(text: &str) -> Cow<'_, str> {
    if text.contains('\0') {
        Cow::Owned(text.replace('\0', ""))
    } else {
        Cow::Borrowed(text)
    }
}

/// Advance width of `text` at the chip's font size.
pub fn measure_text(text: &str, style: &ChipStyle) -> Result<f64, RenderError> {
    let text = printable(text);
    let scratch = ImageSurface::create(Format::ARgb32, 1, 1)?;
    let cr = Context::new(&scratch)?;
    select_font(&cr, style);
    Ok(cr.text_extents(&text)?.x_advance())
}

/// A standalone bitmap just large enough for `text` plus padding: a rounded
/// background with the text centered on both axes.
pub fn render_chip(text: &str, style: &ChipStyle) -> Result<Bitmap, RenderError> {
    let text = printable(text);
    let width = (measure_text(&text, style)? + 2.0 * style.padding_x).ceil();
    let height = style.height().ceil();
    if !(width >= 1.0 && height >= 1.0) {
        return Err(RenderError::Dimensions {
            width: width as i64,
            height: height as i64,
        });
    }

    let surface = ImageSurface::create(Format::ARgb32, width as i32, height as i32)?;
    {
        let cr = Context::new(&surface)?;
        set_source_color(&cr, style.background);
        rounded_rect(&cr, 0.0, 0.0, width, height, style.corner_radius);
        cr.fill()?;

        select_font(&cr, style);
        let extents = cr.text_extents(&text)?;
        let font = cr.font_extents()?;
        // center the em box vertically, the advance horizontally
        let x = (width - extents.x_advance()) / 2.0;
        let y = height / 2.0 + (font.ascent() - font.descent()) / 2.0;
        set_source_color(&cr, style.text_color);
        cr.move_to(x, y);
        cr.show_text(&text)?;
    }
    Bitmap::from_surface(surface)
}
