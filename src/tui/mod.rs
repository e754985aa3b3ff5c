pub mod game_ui;
pub mod input;
pub mod layout;
pub mod widgets;

pub use game_ui::{GameUI, GameUIAction};
pub use input::{KeyContext, KeyEffect, KeyMode};
pub use layout::{BoardLayout, ScreenLayout};
pub use widgets::{BoardWidget, HelpWidget, OverlayWidget};
