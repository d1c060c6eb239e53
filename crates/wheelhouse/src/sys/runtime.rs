use crate::events::AppEvent;
use async_channel::Sender;
use std::path::PathBuf;
use std::thread;
use tokio::runtime::Runtime;

/// Runs the preview's background tasks on their own thread, away from the
/// GTK main loop.
pub fn start_background_services(tx: Sender<AppEvent>, session_path: PathBuf) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                let _ = tx.send_blocking(AppEvent::WatchFailed(e.to_string()));
                return;
            }
        };

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::watcher::watch_session(session_path, tx).await;
                });
            }

            std::future::pending::<()>().await;
        });
    });
}
