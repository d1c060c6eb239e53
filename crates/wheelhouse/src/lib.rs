//! Image wheel application: the working session, persistence, export
//! rendering and the live preview window, on top of `wheelcore` geometry.

pub mod batch;
pub mod cli;
pub mod config;
pub mod events;
pub mod export;
pub mod gui;
pub mod ingest;
pub mod notice;
pub mod persist;
pub mod render;
pub mod session;
pub mod state;
pub mod store;
pub mod style;
pub mod sys;
