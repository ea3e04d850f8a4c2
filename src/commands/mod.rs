//! Operator command handlers.
//!
//! These are the operations the binary exposes. They are organized by functionality:
//! - `settings`: Settings form submission and display
//! - `blacklist`: Excluding contributors from selection
//! - `spin`: The terminal roulette

pub mod blacklist;
pub mod settings;
pub mod spin;

pub use settings::{describe, FormField, SettingsForm};
pub use spin::{run_spin, TerminalStack};
