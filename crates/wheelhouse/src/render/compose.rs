use super::{Bitmap, RenderError, set_source_color};
use crate::style::{SHADOW_ALPHA, StyleConfig, WRAPPER_BACKGROUND};
use cairo::{Context, Format, ImageSurface};
use std::f64::consts::PI;
use wheelcore::{LayoutParams, Placement, WheelLayout};

/// Pre-rendered pixels for one placement, in collection order.
pub struct ItemVisual {
    pub image: Option<ImageSurface>,
    pub label: Option<ImageSurface>,
}

impl ItemVisual {
    pub fn from_bitmaps(image: Bitmap, label: Option<Bitmap>) -> Result<Self, RenderError> {
        Ok(Self {
            image: Some(image.into_surface()?),
            label: label.map(Bitmap::into_surface).transpose()?,
        })
    }
}

/// Where a wheel is being drawn. Exported images always keep the grey
/// wrapper behind each item; the preview drops it along with the outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Preview,
    Export,
}

struct ItemRenderer<'a> {
    placement: &'a Placement,
    params: &'a LayoutParams,
    style: &'a StyleConfig,
    target: Target,
}

impl<'a> ItemRenderer<'a> {
    fn draw(&self, cr: &Context, visual: &ItemVisual) -> Result<(), cairo::Error> {
        if self.style.outline_enabled {
            self.draw_shadow(cr)?;
        }
        if self.style.outline_enabled || self.target == Target::Export {
            self.draw_backdrop(cr)?;
        }
        if let Some(image) = &visual.image {
            self.draw_image(cr, image)?;
        }
        if self.style.outline_enabled {
            self.draw_outline(cr)?;
        }
        Ok(())
    }

    fn circle(&self, cr: &Context, inset: f64, dy: f64) {
        let center = self.placement.bounds.center();
        let radius = (self.placement.bounds.width / 2.0 - inset).max(0.0);
        cr.new_path();
        cr.arc(center.x, center.y + dy, radius, 0.0, 2.0 * PI);
    }

    fn draw_shadow(&self, cr: &Context) -> Result<(), cairo::Error> {
        cr.set_source_rgba(0.0, 0.0, 0.0, SHADOW_ALPHA);
        self.circle(cr, 0.0, self.params.shadow_offset / 2.0);
        cr.fill()
    }

    fn draw_backdrop(&self, cr: &Context) -> Result<(), cairo::Error> {
        set_source_color(cr, WRAPPER_BACKGROUND);
        self.circle(cr, 0.0, 0.0);
        cr.fill()
    }

    /// Scales the cropped image into the circle left inside the outline.
    fn draw_image(&self, cr: &Context, image: &ImageSurface) -> Result<(), cairo::Error> {
        let inset = if self.style.outline_enabled {
            self.params.outline_width
        } else {
            0.0
        };
        let inner = self.placement.bounds.width - 2.0 * inset;
        if inner <= 0.0 || image.width() < 1 {
            return Ok(());
        }
        let origin = self.placement.bounds.origin;
        let scale = inner / image.width() as f64;

        cr.save()?;
        self.circle(cr, inset, 0.0);
        cr.clip();
        cr.translate(origin.x + inset, origin.y + inset);
        cr.scale(scale, scale);
        cr.set_source_surface(image, 0.0, 0.0)?;
        cr.paint()?;
        cr.restore()
    }

    fn draw_outline(&self, cr: &Context) -> Result<(), cairo::Error> {
        let width = self.params.outline_width;
        set_source_color(cr, self.style.outline_color);
        cr.set_line_width(width);
        self.circle(cr, width / 2.0, 0.0);
        cr.stroke()
    }
}

fn draw_label(cr: &Context, placement: &Placement, chip: &ImageSurface) -> Result<(), cairo::Error> {
    let Some(anchor) = &placement.label else {
        return Ok(());
    };
    let x = anchor.center.x - chip.width() as f64 / 2.0;
    let y = anchor.center.y - chip.height() as f64 / 2.0;
    cr.set_source_surface(chip, x, y)?;
    cr.paint()
}

/// Paints the wheel background, every item, then every label on top.
///
/// `visuals` pairs with the layout's placements by index; missing entries
/// draw nothing for that item.
pub fn draw_wheel(
    cr: &Context,
    layout: &WheelLayout,
    style: &StyleConfig,
    visuals: &[ItemVisual],
    target: Target,
) -> Result<(), cairo::Error> {
    let size = layout.size();
    set_source_color(cr, style.wheel_background);
    cr.rectangle(0.0, 0.0, size, size);
    cr.fill()?;

    let WheelLayout::Wheel {
        params, placements, ..
    } = layout
    else {
        return Ok(());
    };

    for (placement, visual) in placements.iter().zip(visuals) {
        ItemRenderer {
            placement,
            params,
            style,
            target,
        }
        .draw(cr, visual)?;
    }

    for (placement, visual) in placements.iter().zip(visuals) {
        if let Some(chip) = &visual.label {
            draw_label(cr, placement, chip)?;
        }
    }
    Ok(())
}

/// Flattens a whole layout into one offscreen export surface of the layout's
/// size.
pub fn flatten(
    layout: &WheelLayout,
    style: &StyleConfig,
    visuals: &[ItemVisual],
) -> Result<ImageSurface, RenderError> {
    let side = layout.size().ceil() as i32;
    let surface = ImageSurface::create(Format::ARgb32, side, side)?;
    {
        let cr = Context::new(&surface)?;
        draw_wheel(&cr, layout, style, visuals, Target::Export)?;
    }
    Ok(surface)
}
