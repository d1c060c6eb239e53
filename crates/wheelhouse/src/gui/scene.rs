use crate::gui::theme::ThemeColors;
use crate::render::compose::{self, ItemVisual, Target};
use crate::render::{ChipStyle, chip, crop};
use crate::state::WheelState;
use cairo::Context;
use palette::Srgba;
use wheelcore::{ViewportClass, WheelLayout};

pub const PLACEHOLDER_TEXT: &str = "Add images to start building your wheel";
const PLACEHOLDER_FONT_SIZE: f64 = 18.0;

/// What the preview window shows: the working wheel laid out for the current
/// window width, with every crop and chip already rendered.
pub struct Scene {
    state: WheelState,
    viewport: ViewportClass,
    layout: WheelLayout,
    visuals: Vec<ItemVisual>,
}

impl Scene {
    pub fn new(state: WheelState, viewport: ViewportClass) -> Self {
        let mut scene = Self {
            state,
            viewport,
            layout: WheelLayout::preview(&[], viewport),
            visuals: Vec::new(),
        };
        scene.rebuild();
        scene
    }

    pub fn state(&self) -> &WheelState {
        &self.state
    }

    pub fn layout(&self) -> &WheelLayout {
        &self.layout
    }

    pub fn replace_state(&mut self, state: WheelState) {
        self.state = state;
        self.rebuild();
    }

    /// Returns whether the breakpoint changed and the scene was rebuilt.
    pub fn set_viewport(&mut self, viewport: ViewportClass) -> bool {
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.rebuild();
        true
    }

    fn rebuild(&mut self) {
        self.layout = WheelLayout::preview(self.state.collection.items(), self.viewport);
        self.visuals = build_visuals(&self.state, &self.layout);
        log::debug!(
            "Preview rebuilt: {} item(s), {} viewport",
            self.visuals.len(),
            self.viewport
        );
    }
}

fn build_visuals(state: &WheelState, layout: &WheelLayout) -> Vec<ItemVisual> {
    let Some(params) = layout.params() else {
        return Vec::new();
    };
    let side = params.item_diameter.round().max(1.0) as i32;
    let chip_style = ChipStyle::new(params, &state.style);

    state
        .collection
        .iter()
        .zip(layout.placements())
        .map(|(item, placement)| {
            let image = crop::crop_source(&item.image, side);
            let label = placement.label.as_ref().and_then(|anchor| {
                chip::render_chip(anchor.text.as_str(), &chip_style)
                    .inspect_err(|e| log::warn!("Failed to render label: {}", e))
                    .ok()
            });
            ItemVisual::from_bitmaps(image, label).unwrap_or_else(|e| {
                log::warn!("Failed to prepare item for preview: {}", e);
                ItemVisual {
                    image: None,
                    label: None,
                }
            })
        })
        .collect()
}

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

/// Draws the scene centered in a `width × height` area, shrunk to fit when
/// the area is smaller than the wheel.
pub fn draw(
    cr: &Context,
    scene: &Scene,
    width: f64,
    height: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    set_source(cr, colors.backdrop);
    cr.paint()?;

    let size = scene.layout.size();
    let fit = (width.min(height) / size).min(1.0);
    cr.save()?;
    cr.translate((width - size * fit) / 2.0, (height - size * fit) / 2.0);
    cr.scale(fit, fit);

    if scene.layout.is_empty() {
        draw_placeholder(cr, size, colors)?;
    } else {
        compose::draw_wheel(
            cr,
            &scene.layout,
            &scene.state.style,
            &scene.visuals,
            Target::Preview,
        )?;
    }
    cr.restore()
}

fn draw_placeholder(cr: &Context, size: f64, colors: &ThemeColors) -> Result<(), cairo::Error> {
    set_source(cr, colors.placeholder_text);
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Normal);
    cr.set_font_size(PLACEHOLDER_FONT_SIZE);
    let ext = cr.text_extents(PLACEHOLDER_TEXT)?;
    cr.move_to(
        (size - ext.width()) / 2.0 - ext.x_bearing(),
        (size - ext.height()) / 2.0 - ext.y_bearing(),
    );
    cr.show_text(PLACEHOLDER_TEXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Bitmap;
    use cairo::{Format, ImageSurface};
    use wheelcore::{ImageSource, Label};

    fn colors() -> ThemeColors {
        ThemeColors {
            placeholder_text: Srgba::new(0.0, 0.0, 0.0, 1.0),
            backdrop: Srgba::new(1.0, 1.0, 1.0, 1.0),
        }
    }

    fn state(labels: &[&str]) -> WheelState {
        let mut state = WheelState::default();
        for label in labels {
            let id = state
                .collection
                .add(ImageSource::from("data:image/png;base64,AAAA"));
            state.collection.relabel(&id, Label::from(*label)).unwrap();
        }
        state
    }

    #[test]
    fn visuals_follow_the_collection() {
        let scene = Scene::new(state(&["Ada", "", "Lin"]), ViewportClass::Normal);
        let labelled: Vec<_> = scene.visuals.iter().map(|v| v.label.is_some()).collect();
        assert_eq!(labelled, vec![true, false, true]);
        assert!(scene.visuals.iter().all(|v| v.image.is_some()));
    }

    #[test]
    fn viewport_changes_rebuild_the_layout() {
        let mut scene = Scene::new(state(&["a", "b"]), ViewportClass::Normal);
        let normal = scene.layout().size();
        assert!(!scene.set_viewport(ViewportClass::Normal));
        assert!(scene.set_viewport(ViewportClass::Narrow));
        assert!(scene.layout().size() < normal);
    }

    #[test]
    fn emptied_scene_shows_the_placeholder() {
        let mut scene = Scene::new(state(&["a"]), ViewportClass::Normal);
        scene.replace_state(WheelState::default());
        assert!(scene.layout().is_empty());
        assert!(scene.visuals.is_empty());

        let surface = ImageSurface::create(Format::ARgb32, 600, 600).unwrap();
        {
            let cr = Context::new(&surface).unwrap();
            draw(&cr, &scene, 600.0, 600.0, &colors()).unwrap();
        }
        let bitmap = Bitmap::from_surface(surface).unwrap();
        assert_eq!(bitmap.argb(0, 0), Some(0xffffffff));
        let inked = (250..350)
            .flat_map(|y| (0..600).map(move |x| (x, y)))
            .any(|(x, y)| bitmap.argb(x, y) != Some(0xffffffff));
        assert!(inked);
    }
}
