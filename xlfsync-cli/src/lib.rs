//! CLI library for testing purposes

pub mod discover;
pub mod settings;

pub use discover::{classify, discover, is_neutral};
pub use settings::{FileSettings, Overrides, resolve};
