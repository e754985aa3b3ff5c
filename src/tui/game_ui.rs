use crossterm::event::KeyCode;
use ratatui::{
	layout::Rect,
	style::{Modifier, Style},
	text::{Line, Span},
	widgets::{Block, Borders, Paragraph},
	Frame,
};

use crate::config::BoardConfig;
use crate::logging::tui as log;
use crate::net::Strategy;
use crate::outcome::Cue;
use crate::session::{SessionEvent, SessionUpdate, SessionView};
use crate::theme::Theme;
use crate::tui::input::{KeyContext, KeyEffect, KeyMode};
use crate::tui::layout::{BoardLayout, ScreenLayout};
use crate::tui::widgets::{BoardWidget, HelpWidget, OverlayWidget};

pub enum GameUIAction {
	None,
	Send(SessionEvent),
	Quit,
}

pub struct GameUI {
	pub view: Option<SessionView>,
	pub key_mode: KeyMode,
	pub prompt: Option<String>,
	pub theme: Theme,
	theme_name: String,
	board: BoardConfig,
	size: usize,
	screen: Rect,
}

impl GameUI {
	pub fn new(theme: Theme, theme_name: String, board: BoardConfig, size: usize) -> Self {
		Self {
			view: None,
			key_mode: KeyMode::default(),
			prompt: None,
			theme,
			theme_name,
			board,
			size,
			screen: Rect::default(),
		}
	}

	pub fn size(&self) -> usize {
		self.size
	}

	/// Takes an update from the session. Returns a cue for the caller to
	/// play.
	pub fn apply_update(&mut self, update: SessionUpdate) -> Option<Cue> {
		match update {
			SessionUpdate::View(view) => {
				self.view = Some(*view);
				None
			}
			SessionUpdate::Cue(cue) => Some(cue),
		}
	}

	fn key_context(&self) -> KeyContext {
		match &self.view {
			Some(view) => KeyContext {
				toggle_available: view.size > 0 && view.opponent.toggle_available,
				overlay_open: view.overlay.is_some(),
				strategy: view.opponent.strategy,
			},
			None => KeyContext {
				toggle_available: false,
				overlay_open: false,
				strategy: Strategy::default(),
			},
		}
	}

	pub fn handle_key(&mut self, key: KeyCode) -> GameUIAction {
		log::key(&format!("{:?}", key));
		let ctx = self.key_context();
		let (mode, effect) = std::mem::take(&mut self.key_mode).handle_key(key, ctx);
		self.key_mode = mode;
		self.process_effect(effect)
	}

	fn process_effect(&mut self, effect: KeyEffect) -> GameUIAction {
		match effect {
			KeyEffect::None => GameUIAction::None,
			KeyEffect::NewGame => {
				self.prompt = None;
				GameUIAction::Send(SessionEvent::NewGame(self.size))
			}
			KeyEffect::NextSize => {
				self.size = self.board.next_size(self.size);
				self.prompt = Some(format!("Board size: {}x{}", self.size, self.size));
				GameUIAction::Send(SessionEvent::NewGame(self.size))
			}
			KeyEffect::Undo => GameUIAction::Send(SessionEvent::Undo),
			KeyEffect::Solve => GameUIAction::Send(SessionEvent::Solve),
			KeyEffect::SetStrategy(strategy) => {
				self.prompt = None;
				GameUIAction::Send(SessionEvent::SetStrategy(strategy))
			}
			KeyEffect::CloseOverlay => GameUIAction::Send(SessionEvent::CloseOverlay),
			KeyEffect::CycleTheme => {
				self.cycle_theme();
				GameUIAction::None
			}
			KeyEffect::SetPrompt(prompt) => {
				self.prompt = Some(prompt);
				GameUIAction::None
			}
			KeyEffect::ClearPrompt => {
				self.prompt = None;
				GameUIAction::None
			}
			KeyEffect::Quit => GameUIAction::Quit,
		}
	}

	/// Mouse press at a terminal position. Cells become activations;
	/// constraint numbers show their tooltip.
	pub fn handle_click(&mut self, column: u16, row: u16) -> GameUIAction {
		log::click(column, row);
		if self.key_mode.is_modal() {
			return GameUIAction::None;
		}
		let Some(view) = &self.view else {
			return GameUIAction::None;
		};
		if view.overlay.is_some() || view.size == 0 {
			return GameUIAction::None;
		}

		let layout = self.board_layout(view.size);
		if let Some(cell) = layout.hit(column, row) {
			return GameUIAction::Send(SessionEvent::Activate(cell));
		}
		if let Some(marker) = layout.node_at(column, row).and_then(|n| view.board.marker(n)) {
			self.prompt = Some(marker.tooltip.clone());
		}
		GameUIAction::None
	}

	fn board_layout(&self, size: usize) -> BoardLayout {
		BoardLayout::centered(ScreenLayout::compute(self.screen).board, size)
	}

	pub fn cycle_theme(&mut self) {
		let available = Theme::list_available();
		if available.is_empty() {
			return;
		}

		let current_idx = available
			.iter()
			.position(|name| name == &self.theme_name)
			.unwrap_or(0);

		let next_idx = (current_idx + 1) % available.len();
		let next_name = &available[next_idx];

		if let Ok(new_theme) = Theme::load_named(next_name) {
			self.theme = new_theme;
			self.theme_name = next_name.clone();
			self.prompt = Some(format!("Theme: {}", next_name));
		}
	}

	pub fn render(&mut self, frame: &mut Frame) {
		let area = frame.area();
		self.screen = area;

		let bg = Block::default().style(Style::default().bg(self.theme.background()));
		frame.render_widget(bg, area);

		let layout = ScreenLayout::compute(area);
		frame.render_widget(self.header(), layout.header);

		if let Some(view) = &self.view {
			if view.size > 0 {
				let board_layout = BoardLayout::centered(layout.board, view.size);
				frame.render_widget(BoardWidget::new(view, &self.theme, board_layout), layout.board);
			}
		}

		let (text, style) = match (&self.prompt, &self.view) {
			(Some(prompt), _) => (prompt.clone(), Style::default().fg(self.theme.text())),
			(None, Some(view)) => (
				view.status.text.clone(),
				Style::default().fg(self.theme.tone(view.status.tone)).add_modifier(Modifier::BOLD),
			),
			(None, None) => ("Connecting...".to_string(), Style::default().fg(self.theme.dim_text())),
		};
		let status = Paragraph::new(text)
			.style(style)
			.block(Block::default().borders(Borders::ALL).title(" Status "));
		frame.render_widget(status, layout.status);

		let footer = Paragraph::new(Line::from(Span::styled(
			"[n]ew  [s]ize  [u]ndo  sol[v]e  [m]ultiplayer  [t]heme  [h]elp  [q]uit",
			Style::default().fg(self.theme.dim_text()),
		)));
		frame.render_widget(footer, layout.footer);

		match self.key_mode {
			KeyMode::Help => {
				frame.render_widget(HelpWidget::new(&self.theme), help_area(area));
			}
			_ => {
				if let Some(content) = self.view.as_ref().and_then(|v| v.overlay.as_ref()) {
					frame.render_widget(OverlayWidget::new(content, &self.theme), OverlayWidget::area(area));
				}
			}
		}
	}

	fn header(&self) -> Paragraph<'static> {
		let mut spans = Vec::new();
		match &self.view {
			Some(view) => {
				spans.push(Span::styled(
					format!("Player {}", view.scores.human),
					Style::default().fg(self.theme.human_slash()),
				));
				if view.opponent.enabled {
					spans.push(Span::raw("  vs  "));
					spans.push(Span::styled(
						format!("CPU {}", view.scores.cpu),
						Style::default().fg(self.theme.cpu_slash()),
					));
					spans.push(Span::styled(
						format!("   Multiplayer: ON (Strategy {})", view.opponent.strategy.id()),
						Style::default().fg(self.theme.opponent_on()),
					));
				}
				if view.pending_cpu {
					spans.push(Span::styled("  ...", Style::default().fg(self.theme.dim_text())));
				}
			}
			None => spans.push(Span::raw("")),
		}

		let title = match &self.view {
			Some(view) if view.size > 0 => format!(" Slant {}x{} | Game #{} ", view.size, view.size, view.game),
			_ => " Slant ".to_string(),
		};
		Paragraph::new(Line::from(spans))
			.block(Block::default().borders(Borders::ALL).title(title))
	}
}

fn help_area(area: Rect) -> Rect {
	let height = (crate::tui::widgets::HELP_LINES.len() as u16 + 2).min(area.height);
	let width = area.width.min(56);
	Rect::new(
		area.x + (area.width - width) / 2,
		area.y + (area.height - height) / 2,
		width,
		height,
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::outcome::{OverlayContent, Tone};
	use crate::render::BoardRenderer;
	use crate::session::{OpponentView, StatusLine};
	use crate::state::{CellCoord, GameState};

	fn ui_with_board(size: usize) -> GameUI {
		let mut ui = GameUI::new(Theme::default(), "default".into(), BoardConfig::default(), size);
		let mut renderer = BoardRenderer::default();
		let state = GameState::blank(size);
		renderer.render(&state);
		ui.view = Some(SessionView {
			game: 1,
			size,
			board: renderer.view().clone(),
			owners: state.owners.clone(),
			status: StatusLine { text: "Player Turn".into(), tone: Tone::HumanTurn },
			overlay: None,
			scores: state.scores,
			opponent: OpponentView {
				enabled: false,
				strategy: Strategy::default(),
				toggle_available: true,
			},
			changed: Vec::new(),
			pending_cpu: false,
			pending_cell: None,
		});
		ui.screen = Rect::new(0, 0, 80, 30);
		ui
	}

	#[test]
	fn click_on_cell_activates_it() {
		let mut ui = ui_with_board(5);
		let layout = ui.board_layout(5);
		let (x, y) = layout.cell_position(CellCoord::new(1, 3));

		match ui.handle_click(x + 1, y) {
			GameUIAction::Send(SessionEvent::Activate(cell)) => assert_eq!(cell, CellCoord::new(1, 3)),
			_ => panic!("expected an activation"),
		}
	}

	#[test]
	fn click_ignored_while_overlay_open() {
		let mut ui = ui_with_board(5);
		if let Some(view) = ui.view.as_mut() {
			view.overlay = Some(OverlayContent { heading: "Draw".into(), message: String::new() });
		}
		let (x, y) = ui.board_layout(5).cell_position(CellCoord::new(0, 0));
		assert!(matches!(ui.handle_click(x, y), GameUIAction::None));
	}

	#[test]
	fn next_size_starts_bigger_game() {
		let mut ui = ui_with_board(5);
		match ui.handle_key(KeyCode::Char('s')) {
			GameUIAction::Send(SessionEvent::NewGame(size)) => assert_eq!(size, 7),
			_ => panic!("expected a new game"),
		}
		assert_eq!(ui.size(), 7);
	}

	#[test]
	fn strategy_picker_round_trip() {
		let mut ui = ui_with_board(5);
		assert!(matches!(ui.handle_key(KeyCode::Char('m')), GameUIAction::None));
		assert!(ui.prompt.is_some());
		ui.handle_key(KeyCode::Right);

		match ui.handle_key(KeyCode::Enter) {
			GameUIAction::Send(SessionEvent::SetStrategy(s)) => assert_eq!(s.id(), 2),
			_ => panic!("expected strategy"),
		}
		assert!(ui.prompt.is_none());
	}

	#[test]
	fn cue_updates_are_passed_back() {
		let mut ui = ui_with_board(5);
		assert_eq!(ui.apply_update(SessionUpdate::Cue(Cue::Error)), Some(Cue::Error));
	}
}
