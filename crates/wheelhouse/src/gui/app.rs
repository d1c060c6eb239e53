use crate::events::AppEvent;
use crate::gui::scene::{self, Scene};
use crate::gui::theme::{self, ThemeColors};
use crate::notice::Notice;
use crate::session::Session;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use wheelcore::ViewportClass;

pub const DEFAULT_WINDOW_SIZE: i32 = 720;

pub struct PreviewModel {
    pub scene: Rc<RefCell<Scene>>,
    pub session: Session,
    pub notice: Option<Notice>,
    /// Bumped on every new notice so a stale dismiss timer cannot hide a
    /// newer message.
    pub notice_generation: u64,
    pub drawing_area: gtk::DrawingArea,
}

pub struct PreviewInit {
    pub session: Session,
    pub rx: async_channel::Receiver<AppEvent>,
}

#[derive(Debug)]
pub enum PreviewMsg {
    SessionChanged,
    ShowNotice(Notice),
    /// `None` dismisses whatever is showing.
    DismissNotice(Option<u64>),
    Close,
}

impl From<AppEvent> for PreviewMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::SessionChanged => PreviewMsg::SessionChanged,
            AppEvent::WatchFailed(e) => PreviewMsg::ShowNotice(Notice::error(format!(
                "Live updates are unavailable: {e}"
            ))),
        }
    }
}

impl PreviewModel {
    fn notice_text(&self) -> String {
        self.notice
            .as_ref()
            .map(|n| n.message.clone())
            .unwrap_or_default()
    }

    fn notice_class(&self) -> String {
        self.notice
            .as_ref()
            .map(|n| n.severity.to_string())
            .unwrap_or_else(|| "info".to_string())
    }
}

#[relm4::component(pub)]
impl SimpleComponent for PreviewModel {
    type Init = PreviewInit;
    type Input = PreviewMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            set_title: Some("Wheelhouse"),
            set_default_size: (DEFAULT_WINDOW_SIZE, DEFAULT_WINDOW_SIZE),

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(PreviewMsg::DismissNotice(None));
                        return glib::Propagation::Stop;
                    }
                    if key == gtk::gdk::Key::q {
                        sender.input(PreviewMsg::Close);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            gtk::Overlay {
                #[name = "drawing_area"]
                gtk::DrawingArea {
                    set_hexpand: true,
                    set_vexpand: true,
                },

                add_overlay = &gtk::Box {
                    set_orientation: gtk::Orientation::Horizontal,
                    set_spacing: 8,
                    set_halign: gtk::Align::Center,
                    set_valign: gtk::Align::Start,
                    #[watch]
                    set_visible: model.notice.is_some(),
                    #[watch]
                    set_css_classes: &["wheel-notice", model.notice_class().as_str()],

                    gtk::Label {
                        set_wrap: true,
                        set_max_width_chars: 60,
                        #[watch]
                        set_label: &model.notice_text(),
                    },

                    gtk::Button {
                        set_label: "Close",
                        set_has_frame: false,
                        connect_clicked[sender] => move |_| {
                            sender.input(PreviewMsg::DismissNotice(None));
                        },
                    },
                },
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let PreviewInit {
            session,
            rx,
        } = init;

        theme::load_css();

        let (state, open_notice) = session.open_or_default();
        let scene = Rc::new(RefCell::new(Scene::new(state, ViewportClass::Normal)));

        let model = PreviewModel {
            scene: scene.clone(),
            session,
            notice: None,
            notice_generation: 0,
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let colors = ThemeColors::from_context(&drawing_area.style_context());
                let mut current = scene.borrow_mut();
                current.set_viewport(ViewportClass::from_width(width as f64));
                if let Err(e) = scene::draw(cr, &current, width as f64, height as f64, &colors) {
                    log::error!("Drawing error: {}", e);
                }
            });

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(PreviewMsg::from(event));
            }
        });

        if let Some(notice) = open_notice {
            sender.input(PreviewMsg::ShowNotice(notice));
        }

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, sender: ComponentSender<Self>) {
        match msg {
            PreviewMsg::SessionChanged => match self.session.open() {
                Ok(state) => {
                    if self.scene.borrow().state() != &state {
                        self.scene.borrow_mut().replace_state(state);
                        self.drawing_area.queue_draw();
                        log::info!("Preview reloaded");
                    }
                }
                Err(e) => {
                    log::error!("Failed to reload session: {}", e);
                    sender.input(PreviewMsg::ShowNotice(Notice::error(e.to_string())));
                }
            },
            PreviewMsg::ShowNotice(notice) => {
                notice.log();
                self.notice_generation += 1;
                if let Some(delay) = notice.severity.auto_dismiss() {
                    let generation = self.notice_generation;
                    let sender = sender.clone();
                    glib::timeout_add_local_once(delay, move || {
                        sender.input(PreviewMsg::DismissNotice(Some(generation)));
                    });
                }
                self.notice = Some(notice);
            }
            PreviewMsg::DismissNotice(generation) => {
                if generation.is_none_or(|g| g == self.notice_generation) {
                    self.notice = None;
                }
            }
            PreviewMsg::Close => relm4::main_application().quit(),
        }
    }
}
