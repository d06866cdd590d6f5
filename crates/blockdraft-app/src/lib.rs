//! BlockDraft Application
//!
//! Headless shell around the editor core: a demo component set, scripted
//! sessions and the keyboard shortcut listing.

mod app;
pub mod components;
pub mod session;
mod shortcuts;

pub use app::{App, AppConfig};
pub use components::demo_registry;
pub use session::{SessionError, SessionStep, parse_script, run_steps};
pub use shortcuts::{Shortcut, ShortcutRegistry};
