//! Dashboard state machine.
//!
//! All state lives in [`Dashboard`] and changes only through
//! [`Dashboard::update`], which is fed from a single event queue. Network
//! fetches, timers, and terminal input run elsewhere and report back as
//! [`Event`]s. Fetch completions are not correlated with their requests:
//! whichever completes last is the snapshot shown.

mod animation;
mod event;
mod format;
pub mod layout;
mod state;

pub use animation::BarAnimation;
pub use event::{Effect, Event};
pub use format::{footer_text, format_reset, NO_RESET};
pub use state::{Dashboard, DashboardConfig, DashboardState, SPINNER_FRAMES};
