use clap::Parser;
use relm4::prelude::*;
use tokio::runtime::Runtime;
use wheelhouse::cli::{Cli, Commands, Workspace};
use wheelhouse::config;
use wheelhouse::gui::app::{PreviewInit, PreviewModel};
use wheelhouse::sys::runtime;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => config::load_settings_from(path)?,
        None => config::load_or_default(),
    };
    let workspace = Workspace::new(settings)?;

    match cli.command {
        Commands::Preview => {
            let session = workspace.session.clone();
            let (tx, rx) = async_channel::bounded(32);

            // Start Background Services
            runtime::start_background_services(tx, session.path().to_path_buf());

            // GTK must not see our own arguments
            let app = RelmApp::new("org.wheelhouse.preview").with_args(Vec::new());
            app.run::<PreviewModel>(PreviewInit { session, rx });
            Ok(())
        }
        command => Runtime::new()?.block_on(workspace.run(command)),
    }
}
