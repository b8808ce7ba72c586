pub mod app;
pub mod audio;
pub mod config;
pub mod data;
pub mod error;
pub mod feedback;
pub mod models;
pub mod playback;
pub mod srs;
pub mod store;
pub mod tracker;
