#![allow(clippy::collapsible_if)]

pub mod config;
pub mod defaults;
pub mod input;
pub mod logging;
pub mod moves;
pub mod net;
pub mod outcome;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod theme;
pub mod timer;
pub mod tui;
