//! Pixel work: decoding, circular crops, label chips, compositing, encoding.

pub mod bitmap;
pub mod chip;
pub mod codec;
pub mod compose;
pub mod crop;
pub mod encode;

pub use bitmap::Bitmap;
pub use chip::ChipStyle;
pub use encode::ExportFormat;

use crate::style::HexColor;
use cairo::Context;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("Surface data is not accessible: {0}")]
    Borrow(#[from] cairo::BorrowError),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] cairo::IoError),
    #[error("Image decode failed: {0}")]
    Decode(String),
    #[error("Image encode failed: {0}")]
    Encode(String),
    #[error("Invalid image dimensions {width}x{height}")]
    Dimensions { width: i64, height: i64 },
}

impl From<glib::Error> for RenderError {
    fn from(e: glib::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

pub(crate) fn set_source_color(cr: &Context, color: HexColor) {
    let (r, g, b, a) = color.components();
    cr.set_source_rgba(r, g, b, a);
}

/// Rounded rectangle path with quadratic corners, expressed as cairo cubics.
pub(crate) fn rounded_rect(cr: &Context, x: f64, y: f64, width: f64, height: f64, radius: f64) {
    let r = radius.clamp(0.0, width.min(height) / 2.0);
    let quad = |from: (f64, f64), ctrl: (f64, f64), to: (f64, f64)| {
        let c1 = (
            from.0 + 2.0 / 3.0 * (ctrl.0 - from.0),
            from.1 + 2.0 / 3.0 * (ctrl.1 - from.1),
        );
        let c2 = (
            to.0 + 2.0 / 3.0 * (ctrl.0 - to.0),
            to.1 + 2.0 / 3.0 * (ctrl.1 - to.1),
        );
        cr.curve_to(c1.0, c1.1, c2.0, c2.1, to.0, to.1);
    };
    let (right, bottom) = (x + width, y + height);

    cr.new_path();
    cr.move_to(x + r, y);
    cr.line_to(right - r, y);
    quad((right - r, y), (right, y), (right, y + r));
    cr.line_to(right, bottom - r);
    quad((right, bottom - r), (right, bottom), (right - r, bottom));
    cr.line_to(x + r, bottom);
    quad((x + r, bottom), (x, bottom), (x, bottom - r));
    cr.line_to(x, y + r);
    quad((x, y + r), (x, y), (x + r, y));
    cr.close_path();
}
