pub mod app;
pub mod scene;
pub mod theme;
