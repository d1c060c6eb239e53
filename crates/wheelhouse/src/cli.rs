use crate::config::{self, STORE_FILE_NAME, Settings};
use crate::export::{ExportConfig, Exporter};
use crate::ingest;
use crate::notice::{Notice, Severity};
use crate::persist::{self, LoadOutcome, PersistError};
use crate::render::ExportFormat;
use crate::session::Session;
use crate::state::WheelState;
use crate::store::FileStore;
use crate::style::HexColor;
use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wheelcore::{Item, Label, WheelLayout};

#[derive(Parser, Debug)]
#[command(name = "wheelhouse", version, about, long_about = None)]
pub struct Cli {
    /// Read settings from this file instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add images to the wheel. Files that are not images are skipped.
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the wheel's items in order.
    List,
    /// Set an item's label; an empty label hides it.
    Label {
        /// Item id or 1-based position.
        item: String,
        text: String,
    },
    /// Move an item to a new 1-based position.
    Move { item: String, to: usize },
    /// Remove an item.
    Remove { item: String },
    /// Put the items in random order.
    Shuffle,
    /// Remove every item.
    Clear,
    /// Show or change colors and the outline.
    Style(StyleArgs),
    /// Store the wheel, shrinking oversized images.
    Save,
    /// Replace the wheel with the stored one.
    Load,
    /// Print the computed layout as JSON.
    Layout {
        /// Lay out for export at this scale instead of the preview.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=10))]
        scale: Option<u32>,
    },
    /// Render the wheel to character-shipping-wheel.<format>.
    Export {
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=10))]
        scale: Option<u32>,
        #[arg(long)]
        format: Option<ExportFormat>,
        /// JPEG quality between 0 and 1.
        #[arg(long)]
        quality: Option<f64>,
        /// Output directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Open a window showing the wheel, updated as it changes.
    Preview,
    /// Manage the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Write a default configuration file if none exists.
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StyleArgs {
    #[arg(long)]
    pub outline: Option<Toggle>,
    #[arg(long)]
    pub outline_color: Option<HexColor>,
    #[arg(long)]
    pub wheel_bg: Option<HexColor>,
    #[arg(long)]
    pub label_text: Option<HexColor>,
    #[arg(long)]
    pub label_bg: Option<HexColor>,
}

impl StyleArgs {
    fn is_empty(&self) -> bool {
        self.outline.is_none()
            && self.outline_color.is_none()
            && self.wheel_bg.is_none()
            && self.label_text.is_none()
            && self.label_bg.is_none()
    }

    fn apply(&self, state: &mut WheelState) {
        let style = &mut state.style;
        if let Some(toggle) = self.outline {
            style.outline_enabled = toggle == Toggle::On;
        }
        if let Some(color) = self.outline_color {
            style.outline_color = color;
        }
        if let Some(color) = self.wheel_bg {
            style.wheel_background = color;
        }
        if let Some(color) = self.label_text {
            style.label_text = color;
        }
        if let Some(color) = self.label_bg {
            style.label_background = color;
        }
    }
}

pub fn print_notice(notice: &Notice) {
    log::debug!("notice ({}): {}", notice.severity, notice.message);
    match notice.severity {
        Severity::Error => eprintln!("error: {}", notice.message),
        Severity::Success | Severity::Info => println!("{}", notice.message),
    }
}

/// Session, store and settings for one command invocation.
pub struct Workspace {
    pub settings: Settings,
    pub session: Session,
    pub store: FileStore,
}

impl Workspace {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let directory = settings
            .storage
            .directory()
            .context("Failed to locate the data directory")?;
        Ok(Self {
            session: Session::in_directory(&directory),
            store: FileStore::new(directory.join(STORE_FILE_NAME), settings.storage.capacity_bytes),
            settings,
        })
    }

    fn open(&self) -> WheelState {
        let (state, notice) = self.session.open_or_default();
        if let Some(notice) = notice {
            print_notice(&notice);
        }
        state
    }

    fn commit(&self, state: &WheelState) -> anyhow::Result<()> {
        self.session
            .commit(state)
            .with_context(|| format!("Failed to update {}", self.session.path().display()))
    }

    fn find<'a>(state: &'a WheelState, key: &str) -> anyhow::Result<&'a Item> {
        state
            .collection
            .find(key)
            .with_context(|| format!("No item matches '{key}'"))
    }

    /// Runs every command except `preview`, which needs the GUI.
    pub async fn run(&self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Add { files } => self.add(files).await,
            Commands::List => {
                self.list();
                Ok(())
            }
            Commands::Label { item, text } => {
                let mut state = self.open();
                let id = Self::find(&state, &item)?.id.clone();
                state.collection.relabel(&id, Label::new(text))?;
                self.commit(&state)
            }
            Commands::Move { item, to } => {
                let mut state = self.open();
                let id = Self::find(&state, &item)?.id.clone();
                let from = state.collection.position(&id).unwrap_or_default();
                let to = to.checked_sub(1).context("Positions start at 1")?;
                state.collection.move_item(from, to)?;
                self.commit(&state)
            }
            Commands::Remove { item } => {
                let mut state = self.open();
                let id = Self::find(&state, &item)?.id.clone();
                state.collection.remove(&id)?;
                self.commit(&state)?;
                if state.collection.is_empty() {
                    print_notice(&Notice::info("The wheel is now empty."));
                }
                Ok(())
            }
            Commands::Shuffle => {
                let mut state = self.open();
                if !state.controls().shuffle {
                    print_notice(&Notice::info("There is nothing to shuffle."));
                    return Ok(());
                }
                state.collection.shuffle(&mut rand::rng());
                self.commit(&state)
            }
            Commands::Clear => {
                let mut state = self.open();
                if !state.controls().clear {
                    print_notice(&Notice::info("The wheel is already empty."));
                    return Ok(());
                }
                state.collection.clear();
                self.commit(&state)?;
                print_notice(&Notice::success("All images cleared."));
                Ok(())
            }
            Commands::Style(args) => {
                let mut state = self.open();
                if !args.is_empty() {
                    args.apply(&mut state);
                    self.commit(&state)?;
                }
                print_style(&state);
                Ok(())
            }
            Commands::Save => self.save().await,
            Commands::Load => self.load().await,
            Commands::Layout { scale } => {
                let state = self.open();
                let items = state.collection.items();
                let viewport = self.settings.viewport;
                let layout = match scale {
                    Some(scale) => WheelLayout::export(items, viewport, scale),
                    None => WheelLayout::preview(items, viewport),
                };
                println!("{}", serde_json::to_string_pretty(&layout)?);
                Ok(())
            }
            Commands::Export {
                scale,
                format,
                quality,
                output,
            } => {
                let defaults = self.settings.export.config();
                let config = ExportConfig {
                    scale: scale.unwrap_or(defaults.scale),
                    format: format.unwrap_or(defaults.format),
                    quality: quality.unwrap_or(defaults.quality),
                };
                let directory = output.unwrap_or_else(|| self.settings.export.directory());
                self.export(config, directory).await;
                Ok(())
            }
            Commands::Config(ConfigCommand::Init) => {
                let path = config::write_default_config()?;
                println!("{}", path.display());
                Ok(())
            }
            Commands::Preview => anyhow::bail!("The preview runs on the main thread"),
        }
    }

    async fn add(&self, files: Vec<PathBuf>) -> anyhow::Result<()> {
        let mut state = self.open();
        let ingested = ingest::ingest_files(files).await;
        let added = state.collection.extend(ingested.images).len();
        if added > 0 {
            self.commit(&state)?;
            print_notice(&Notice::success(format!("Added {added} image(s).")));
        }
        if !ingested.skipped.is_empty() {
            print_notice(&Notice::info(format!(
                "Skipped {} file(s) that are not images.",
                ingested.skipped.len()
            )));
        }
        Ok(())
    }

    fn list(&self) {
        let state = self.open();
        if state.collection.is_empty() {
            println!("{}", crate::gui::scene::PLACEHOLDER_TEXT);
            return;
        }
        for (index, item) in state.collection.iter().enumerate() {
            let label = if item.label.is_visible() {
                item.label.as_str()
            } else {
                "(no label)"
            };
            println!("{:>3}. {}  {}", index + 1, item.id, label);
        }
    }

    async fn save(&self) -> anyhow::Result<()> {
        let state = self.open();
        if !state.controls().save {
            print_notice(&Notice::info("Add some images before saving."));
            return Ok(());
        }
        let max = self.settings.storage.max_image_dimension;
        let notice = match persist::save(&self.store, &state, max).await {
            Ok(report) => report.notice(),
            Err(e) => e.notice(),
        };
        print_notice(&notice);
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<()> {
        let (state, notice) = match persist::load(&self.store).await {
            Ok(outcome) => {
                let notice = outcome.notice();
                let state = match outcome {
                    LoadOutcome::Missing => WheelState::default(),
                    LoadOutcome::Loaded { state, .. } => state,
                };
                (state, notice)
            }
            Err(e @ PersistError::Corrupt(_)) => (WheelState::default(), e.notice()),
            Err(e) => {
                print_notice(&Notice::error(format!("Failed to load wheel: {e}")));
                return Ok(());
            }
        };
        self.commit(&state)?;
        print_notice(&notice);
        Ok(())
    }

    async fn export(&self, config: ExportConfig, directory: PathBuf) {
        let state = self.open();
        let exporter = Exporter::new();
        let notice = match exporter
            .export_to(&state, self.settings.viewport, config, &directory)
            .await
        {
            Ok(path) => crate::export::success_notice(&path),
            Err(e) => {
                log::error!("Export failed: {}", e);
                e.notice()
            }
        };
        print_notice(&notice);
    }
}

fn print_style(state: &WheelState) {
    let style = &state.style;
    let outline = if style.outline_enabled { "on" } else { "off" };
    println!("outline        {outline}");
    println!("outline color  {}", style.outline_color);
    println!("wheel bg       {}", style.wheel_background);
    println!("label text     {}", style.label_text);
    println!("label bg       {}", style.label_background);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("wheelhouse").chain(args.iter().copied())).unwrap()
    }

    fn workspace(name: &str) -> Workspace {
        let dir = std::env::temp_dir().join(format!("wheelhouse-cli-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut settings = Settings::default();
        settings.storage.directory = Some(dir);
        Workspace::new(settings).unwrap()
    }

    fn seed(workspace: &Workspace, labels: &[&str]) {
        let mut state = WheelState::default();
        for label in labels {
            let id = state
                .collection
                .add(wheelcore::ImageSource::from("data:image/png;base64,AA=="));
            state.collection.relabel(&id, Label::from(*label)).unwrap();
        }
        workspace.commit(&state).unwrap();
    }

    fn labels(workspace: &Workspace) -> Vec<String> {
        workspace
            .session
            .open()
            .unwrap()
            .collection
            .iter()
            .map(|i| i.label.to_string())
            .collect()
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_style_and_export_flags() {
        let cli = parse(&["style", "--outline", "off", "--wheel-bg", "#000000"]);
        let Commands::Style(args) = cli.command else {
            panic!("expected style");
        };
        assert_eq!(args.outline, Some(Toggle::Off));
        assert_eq!(args.wheel_bg, Some(HexColor::rgb(0, 0, 0)));

        let cli = parse(&["export", "--scale", "8", "--format", "jpeg", "-o", "/tmp"]);
        assert!(matches!(
            cli.command,
            Commands::Export {
                scale: Some(8),
                format: Some(ExportFormat::Jpeg),
                ..
            }
        ));
        let too_big = ["wheelhouse", "export", "--scale", "11"];
        assert!(Cli::try_parse_from(too_big).is_err());
    }

    #[tokio::test]
    async fn edits_go_through_the_session() {
        let workspace = workspace("edits");
        seed(&workspace, &["a", "b", "c"]);

        workspace
            .run(Commands::Label {
                item: "2".into(),
                text: "bee".into(),
            })
            .await
            .unwrap();
        workspace
            .run(Commands::Move {
                item: "1".into(),
                to: 3,
            })
            .await
            .unwrap();
        assert_eq!(labels(&workspace), vec!["bee", "c", "a"]);

        workspace
            .run(Commands::Remove { item: "2".into() })
            .await
            .unwrap();
        assert_eq!(labels(&workspace), vec!["bee", "a"]);

        assert!(workspace
            .run(Commands::Remove { item: "9".into() })
            .await
            .is_err());
    }

    #[tokio::test]
    async fn style_changes_persist() {
        let workspace = workspace("style");
        let args = StyleArgs {
            outline: Some(Toggle::Off),
            label_bg: Some(HexColor::rgb(1, 2, 3)),
            ..StyleArgs::default()
        };
        workspace.run(Commands::Style(args)).await.unwrap();
        let style = workspace.session.open().unwrap().style;
        assert!(!style.outline_enabled);
        assert_eq!(style.label_background, HexColor::rgb(1, 2, 3));
    }

    #[tokio::test]
    async fn save_clear_load_restores_the_wheel() {
        let workspace = workspace("persist");
        seed(&workspace, &["x", "y"]);
        workspace.run(Commands::Save).await.unwrap();
        workspace.run(Commands::Clear).await.unwrap();
        assert!(labels(&workspace).is_empty());
        workspace.run(Commands::Load).await.unwrap();
        assert_eq!(labels(&workspace), vec!["x", "y"]);
    }

    #[tokio::test]
    async fn corrupt_store_file_resets_to_a_new_wheel() {
        let workspace = workspace("corrupt");
        seed(&workspace, &["kept?"]);
        std::fs::create_dir_all(workspace.store.path().parent().unwrap()).unwrap();
        std::fs::write(workspace.store.path(), "{oops").unwrap();

        workspace.run(Commands::Load).await.unwrap();
        assert_eq!(workspace.session.open().unwrap(), WheelState::default());
    }
}
