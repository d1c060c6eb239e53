use gtk::gdk;
use gtk::prelude::*;
use gtk4 as gtk;
use palette::Srgba;

/// Colors for what the window draws around the wheel itself.
pub struct ThemeColors {
    pub placeholder_text: Srgba<f64>,
    pub backdrop: Srgba<f64>,
}

impl ThemeColors {
    pub fn from_context(context: &gtk::StyleContext) -> Self {
        Self {
            placeholder_text: Self::lookup_color(
                context,
                "theme_fg_color",
                Srgba::new(0.4, 0.4, 0.4, 0.8),
                Some(0.6),
            ),
            backdrop: Self::lookup_color(
                context,
                "theme_bg_color",
                Srgba::new(0.95, 0.95, 0.95, 1.0),
                None,
            ),
        }
    }

    fn lookup_color(
        context: &gtk::StyleContext,
        name: &str,
        fallback: Srgba<f64>,
        alpha_override: Option<f64>,
    ) -> Srgba<f64> {
        context
            .lookup_color(name)
            .map(|c| {
                let (r, g, b, a) = (
                    c.red() as f64,
                    c.green() as f64,
                    c.blue() as f64,
                    c.alpha() as f64,
                );
                Srgba::new(r, g, b, alpha_override.unwrap_or(a))
            })
            .unwrap_or(fallback)
    }
}

pub fn load_css() {
    let provider = gtk::CssProvider::new();
    let css_data = "
.wheel-notice {
    padding: 8px 12px;
    margin: 12px;
    border-radius: 6px;
    color: white;
}
.wheel-notice.success { background-color: #16a34a; }
.wheel-notice.info { background-color: #2563eb; }
.wheel-notice.error { background-color: #dc2626; }
.wheel-notice button {
    color: white;
    min-height: 0;
    padding: 0 6px;
}
";
    provider.load_from_data(css_data);

    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
