//! Platform layer
//!
//! Everything that touches the outside world on behalf of the frontend:
//! - Keyboard input (crossterm events)
//! - Terminal drawing
//! - Data directory resolution

pub mod input;
pub mod paths;
pub mod term;

pub use input::{Command, InputFrame};
pub use paths::DataPaths;
pub use term::{TerminalGuard, climb_lines, describe_drill_event, drill_lines};
