#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The session file was written, replaced or removed.
    SessionChanged,
    WatchFailed(String),
}
