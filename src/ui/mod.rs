mod app;
pub mod components;
pub(crate) mod input;
mod theme;

pub use app::{shutdown_runtime, App, SHUTDOWN_GRACE};
pub use theme::Theme;
