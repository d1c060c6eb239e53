use crate::config::ConfigError;
use crate::events::AppEvent;
use async_channel::Sender;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

fn touches(paths: &[PathBuf], target: &Path) -> bool {
    paths.iter().any(|p| p == target)
}

fn start_watcher(
    directory: &Path,
    bridge_tx: async_channel::Sender<notify::Result<notify::Event>>,
) -> Result<RecommendedWatcher, ConfigError> {
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    )?;
    watcher.watch(directory, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Sends [`AppEvent::SessionChanged`] whenever the session file changes.
///
/// The parent directory is watched rather than the file, since commits
/// replace the file by renaming over it.
pub async fn watch_session(session_path: PathBuf, tx: Sender<AppEvent>) {
    let Some(directory) = session_path.parent().map(Path::to_path_buf) else {
        return;
    };

    if let Err(e) = fs_err::create_dir_all(&directory) {
        log::error!("Failed to create session directory for watching: {}", e);
        let _ = tx.send(AppEvent::WatchFailed(e.to_string())).await;
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let _watcher = match start_watcher(&directory, bridge_tx) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to watch {}: {}", directory.display(), e);
            let _ = tx.send(AppEvent::WatchFailed(e.to_string())).await;
            return;
        }
    };

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                if is_relevant(&event.kind)
                    && touches(&event.paths, &session_path)
                    && tx.send(AppEvent::SessionChanged).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind};
    use std::time::Duration;

    #[test]
    fn only_changes_to_the_session_file_count() {
        let target = PathBuf::from("/data/session.json");
        assert!(touches(&[target.clone()], &target));
        assert!(!touches(&[PathBuf::from("/data/session.tmp")], &target));
        assert!(is_relevant(&EventKind::Create(CreateKind::File)));
        assert!(is_relevant(&EventKind::Modify(ModifyKind::Any)));
        assert!(!is_relevant(&EventKind::Access(notify::event::AccessKind::Any)));
    }

    #[tokio::test]
    async fn reports_a_committed_session() {
        let dir = std::env::temp_dir().join(format!("wheelhouse-watch-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let session = crate::session::Session::in_directory(&dir);

        let (tx, rx) = async_channel::unbounded();
        let path = session.path().to_path_buf();
        tokio::spawn(watch_session(path, tx));
        tokio::time::sleep(Duration::from_millis(200)).await;

        session.commit(&crate::state::WheelState::default()).unwrap();
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, AppEvent::SessionChanged);
    }
}
