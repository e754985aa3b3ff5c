use crossterm::event::KeyCode;

use crate::net::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
	#[default]
	Playing,
	PickingStrategy { selected: Strategy },
	Help,
}

/// What the rest of the front-end needs to know to interpret a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
	pub toggle_available: bool,
	pub overlay_open: bool,
	pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEffect {
	None,
	NewGame,
	NextSize,
	Undo,
	Solve,
	SetStrategy(Strategy),
	CloseOverlay,
	CycleTheme,
	SetPrompt(String),
	ClearPrompt,
	Quit,
}

impl KeyMode {
	pub fn is_modal(&self) -> bool {
		!matches!(self, Self::Playing)
	}

	pub fn handle_key(self, key: KeyCode, ctx: KeyContext) -> (Self, KeyEffect) {
		match self {
			Self::Playing => handle_playing(key, ctx),
			Self::PickingStrategy { selected } => handle_picking(selected, key),
			Self::Help => handle_help(key),
		}
	}
}

fn handle_playing(key: KeyCode, ctx: KeyContext) -> (KeyMode, KeyEffect) {
	let effect = match key {
		KeyCode::Char('n') => KeyEffect::NewGame,
		KeyCode::Char('s') => KeyEffect::NextSize,
		KeyCode::Char('u') => KeyEffect::Undo,
		KeyCode::Char('v') => KeyEffect::Solve,
		KeyCode::Char('t') => KeyEffect::CycleTheme,
		KeyCode::Char('q') => KeyEffect::Quit,

		KeyCode::Char('m') => {
			if !ctx.toggle_available {
				return (
					KeyMode::Playing,
					KeyEffect::SetPrompt("Opponent can't be changed right now".into()),
				);
			}
			let selected = ctx.strategy;
			return (KeyMode::PickingStrategy { selected }, KeyEffect::SetPrompt(strategy_prompt(selected)));
		}

		KeyCode::Char('h') | KeyCode::Char('?') => {
			return (KeyMode::Help, KeyEffect::ClearPrompt);
		}

		KeyCode::Esc | KeyCode::Enter if ctx.overlay_open => KeyEffect::CloseOverlay,
		KeyCode::Esc => KeyEffect::ClearPrompt,

		_ => KeyEffect::None,
	};
	(KeyMode::Playing, effect)
}

fn handle_picking(selected: Strategy, key: KeyCode) -> (KeyMode, KeyEffect) {
	let picked = |s: Strategy| (KeyMode::PickingStrategy { selected: s }, KeyEffect::SetPrompt(strategy_prompt(s)));

	match key {
		KeyCode::Left | KeyCode::Up => picked(selected.prev()),
		KeyCode::Right | KeyCode::Down => picked(selected.next()),
		KeyCode::Char(c @ '1'..='9') => match c.to_digit(10).and_then(|d| Strategy::new(d as u8)) {
			Some(s) => picked(s),
			None => (KeyMode::PickingStrategy { selected }, KeyEffect::None),
		},
		KeyCode::Enter => (KeyMode::Playing, KeyEffect::SetStrategy(selected)),
		KeyCode::Esc => (KeyMode::Playing, KeyEffect::ClearPrompt),
		KeyCode::Char('q') => (KeyMode::PickingStrategy { selected }, KeyEffect::Quit),
		_ => (KeyMode::PickingStrategy { selected }, KeyEffect::None),
	}
}

fn handle_help(key: KeyCode) -> (KeyMode, KeyEffect) {
	match key {
		KeyCode::Char('q') => (KeyMode::Help, KeyEffect::Quit),
		_ => (KeyMode::Playing, KeyEffect::None),
	}
}

pub fn strategy_prompt(selected: Strategy) -> String {
	let options: Vec<String> = (Strategy::MIN..=Strategy::MAX)
		.map(|id| {
			if id == selected.id() {
				format!("[{}]", id)
			} else {
				format!(" {} ", id)
			}
		})
		.collect();
	format!("Opponent strategy: {}  [←/→ choose] [Enter confirm] [Esc cancel]", options.join(" "))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ctx() -> KeyContext {
		KeyContext {
			toggle_available: true,
			overlay_open: false,
			strategy: Strategy::default(),
		}
	}

	#[test]
	fn playing_q_quits() {
		let (mode, effect) = KeyMode::Playing.handle_key(KeyCode::Char('q'), ctx());
		assert_eq!(mode, KeyMode::Playing);
		assert_eq!(effect, KeyEffect::Quit);
	}

	#[test]
	fn playing_commands() {
		for (key, expected) in [
			('n', KeyEffect::NewGame),
			('s', KeyEffect::NextSize),
			('u', KeyEffect::Undo),
			('v', KeyEffect::Solve),
			('t', KeyEffect::CycleTheme),
			('x', KeyEffect::None),
		] {
			let (mode, effect) = KeyMode::Playing.handle_key(KeyCode::Char(key), ctx());
			assert_eq!(mode, KeyMode::Playing);
			assert_eq!(effect, expected, "key {}", key);
		}
	}

	#[test]
	fn m_opens_picker_on_current_strategy() {
		let ctx = KeyContext { strategy: Strategy::new(2).unwrap(), ..ctx() };
		let (mode, effect) = KeyMode::Playing.handle_key(KeyCode::Char('m'), ctx);

		assert_eq!(mode, KeyMode::PickingStrategy { selected: Strategy::new(2).unwrap() });
		assert!(matches!(effect, KeyEffect::SetPrompt(p) if p.contains("[2]")));
	}

	#[test]
	fn m_refused_while_toggle_unavailable() {
		let ctx = KeyContext { toggle_available: false, ..ctx() };
		let (mode, effect) = KeyMode::Playing.handle_key(KeyCode::Char('m'), ctx);

		assert_eq!(mode, KeyMode::Playing);
		assert!(matches!(effect, KeyEffect::SetPrompt(_)));
	}

	#[test]
	fn picker_navigation_wraps() {
		let mode = KeyMode::PickingStrategy { selected: Strategy::new(3).unwrap() };
		let (mode, _) = mode.handle_key(KeyCode::Right, ctx());
		assert_eq!(mode, KeyMode::PickingStrategy { selected: Strategy::new(1).unwrap() });

		let (mode, _) = mode.handle_key(KeyCode::Left, ctx());
		assert_eq!(mode, KeyMode::PickingStrategy { selected: Strategy::new(3).unwrap() });
	}

	#[test]
	fn picker_digits_select_only_valid_ids() {
		let mode = KeyMode::PickingStrategy { selected: Strategy::default() };
		let (mode, _) = mode.handle_key(KeyCode::Char('2'), ctx());
		assert_eq!(mode, KeyMode::PickingStrategy { selected: Strategy::new(2).unwrap() });

		let (mode, effect) = mode.handle_key(KeyCode::Char('7'), ctx());
		assert_eq!(mode, KeyMode::PickingStrategy { selected: Strategy::new(2).unwrap() });
		assert_eq!(effect, KeyEffect::None);
	}

	#[test]
	fn picker_confirm_and_cancel() {
		let mode = KeyMode::PickingStrategy { selected: Strategy::new(3).unwrap() };
		let (next, effect) = mode.handle_key(KeyCode::Enter, ctx());
		assert_eq!(next, KeyMode::Playing);
		assert_eq!(effect, KeyEffect::SetStrategy(Strategy::new(3).unwrap()));

		let (next, effect) = mode.handle_key(KeyCode::Esc, ctx());
		assert_eq!(next, KeyMode::Playing);
		assert_eq!(effect, KeyEffect::ClearPrompt);
	}

	#[test]
	fn escape_closes_open_overlay() {
		let ctx = KeyContext { overlay_open: true, ..ctx() };
		let (_, effect) = KeyMode::Playing.handle_key(KeyCode::Esc, ctx);
		assert_eq!(effect, KeyEffect::CloseOverlay);

		let (_, effect) = KeyMode::Playing.handle_key(KeyCode::Enter, ctx);
		assert_eq!(effect, KeyEffect::CloseOverlay);
	}

	#[test]
	fn help_dismissed_by_any_key() {
		let (mode, _) = KeyMode::Playing.handle_key(KeyCode::Char('?'), ctx());
		assert_eq!(mode, KeyMode::Help);
		assert!(mode.is_modal());

		let (mode, effect) = mode.handle_key(KeyCode::Char('n'), ctx());
		assert_eq!(mode, KeyMode::Playing);
		assert_eq!(effect, KeyEffect::None);
	}
}
