use ratatui::{
	buffer::Buffer,
	layout::{Alignment, Rect},
	style::{Modifier, Style},
	text::{Line, Span},
	widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::outcome::OverlayContent;
use crate::render::MarkerMark;
use crate::session::SessionView;
use crate::state::{CellCoord, Node, Side};
use crate::theme::Theme;
use crate::tui::layout::{BoardLayout, CELL_HEIGHT, CELL_WIDTH};

pub struct BoardWidget<'a> {
	view: &'a SessionView,
	theme: &'a Theme,
	layout: BoardLayout,
}

impl<'a> BoardWidget<'a> {
	pub fn new(view: &'a SessionView, theme: &'a Theme, layout: BoardLayout) -> Self {
		Self { view, theme, layout }
	}

	fn cell_style(&self, cell: CellCoord) -> Style {
		let Some(cell_view) = self.view.board.cell(cell) else {
			return Style::default();
		};

		let fg = match self.view.owner(cell) {
			Some(Side::Cpu) => self.theme.cpu_slash(),
			_ => self.theme.human_slash(),
		};
		let mut style = Style::default().fg(fg);

		if cell_view.in_loop {
			style = style.bg(self.theme.loop_cell()).add_modifier(Modifier::BOLD);
		} else if self.view.pending_cell.map(|(c, _)| c) == Some(cell) {
			style = style.bg(self.theme.pending_cell());
		}
		if self.view.changed.contains(&cell) {
			style = style.add_modifier(Modifier::BOLD);
		}
		style
	}

	fn node_span(&self, node: Node) -> (String, Style) {
		match self.view.board.marker(node) {
			Some(marker) => {
				let mut style = Style::default().fg(self.theme.marker(marker.mark));
				if marker.mark != MarkerMark::Neutral {
					style = style.add_modifier(Modifier::BOLD);
				}
				(marker.required.to_string(), style)
			}
			None => ("+".to_string(), Style::default().fg(self.theme.grid())),
		}
	}
}

impl Widget for BoardWidget<'_> {
	fn render(self, area: Rect, buf: &mut Buffer) {
		let size = self.view.size;
		if size == 0 {
			return;
		}
		let grid = Style::default().fg(self.theme.grid());

		for r in 0..=size {
			for c in 0..=size {
				let node = Node::new(r, c);
				let (x, y) = self.layout.node_position(node);
				if !area.contains((x, y).into()) {
					continue;
				}
				let (symbol, style) = self.node_span(node);
				buf.set_string(x, y, symbol, style);

				if c < size {
					buf.set_string(x + 1, y, "─".repeat((CELL_WIDTH - 1) as usize), grid);
				}
				if r < size {
					for dy in 1..CELL_HEIGHT {
						buf.set_string(x, y + dy, "│", grid);
					}
				}
			}
		}

		for r in 0..size {
			for c in 0..size {
				let cell = CellCoord::new(r, c);
				let (x, y) = self.layout.cell_position(cell);
				if !area.contains((x, y).into()) {
					continue;
				}
				let glyph = self
					.view
					.board
					.cell(cell)
					.and_then(|v| v.slash)
					.map(|s| s.glyph())
					.unwrap_or(' ');
				buf.set_string(x, y, format!(" {} ", glyph), self.cell_style(cell));
			}
		}
	}
}

pub struct OverlayWidget<'a> {
	content: &'a OverlayContent,
	theme: &'a Theme,
}

impl<'a> OverlayWidget<'a> {
	pub fn new(content: &'a OverlayContent, theme: &'a Theme) -> Self {
		Self { content, theme }
	}

	pub fn area(outer: Rect) -> Rect {
		let width = outer.width.min(48);
		let height = outer.height.min(8);
		Rect::new(
			outer.x + (outer.width - width) / 2,
			outer.y + (outer.height - height) / 2,
			width,
			height,
		)
	}
}

impl Widget for OverlayWidget<'_> {
	fn render(self, area: Rect, buf: &mut Buffer) {
		Clear.render(area, buf);

		let block = Block::default()
			.borders(Borders::ALL)
			.border_type(self.theme.overlay_border_type())
			.border_style(Style::default().fg(self.theme.overlay_border()))
			.title(Line::from(" Game Over ").centered());

		let lines = vec![
			Line::from(Span::styled(
				self.content.heading.clone(),
				Style::default().fg(self.theme.text()).add_modifier(Modifier::BOLD),
			)),
			Line::raw(""),
			Line::from(Span::styled(
				self.content.message.clone(),
				Style::default().fg(self.theme.text()),
			)),
			Line::raw(""),
			Line::from(Span::styled("[Enter] close", Style::default().fg(self.theme.dim_text()))),
		];

		Paragraph::new(lines)
			.block(block)
			.alignment(Alignment::Center)
			.wrap(Wrap { trim: true })
			.render(area, buf);
	}
}

pub const HELP_LINES: &[(&str, &str)] = &[
	("click", "toggle slash (L, then R)"),
	("double click", "clear cell"),
	("click a number", "show its constraint"),
	("n", "new game"),
	("s", "new game, next board size"),
	("u", "undo"),
	("v", "solve"),
	("m", "choose opponent strategy"),
	("t", "cycle theme"),
	("Esc / Enter", "close result"),
	("q", "quit"),
];

pub struct HelpWidget<'a> {
	theme: &'a Theme,
}

impl<'a> HelpWidget<'a> {
	pub fn new(theme: &'a Theme) -> Self {
		Self { theme }
	}
}

impl Widget for HelpWidget<'_> {
	fn render(self, area: Rect, buf: &mut Buffer) {
		Clear.render(area, buf);

		let key_style = Style::default().fg(self.theme.tone(crate::outcome::Tone::Prompt));
		let text_style = Style::default().fg(self.theme.text());
		let lines: Vec<Line> = HELP_LINES
			.iter()
			.map(|(key, what)| {
				Line::from(vec![
					Span::styled(format!("{:>16}  ", key), key_style),
					Span::styled(*what, text_style),
				])
			})
			.collect();

		Paragraph::new(lines)
			.block(Block::default().borders(Borders::ALL).title(" Help "))
			.render(area, buf);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::render::BoardRenderer;
	use crate::session::{OpponentView, StatusLine};
	use crate::state::{GameState, Slash};
	use crate::net::Strategy;
	use crate::outcome::Tone;

	fn view_of(state: &GameState) -> SessionView {
		let mut renderer = BoardRenderer::default();
		renderer.render(state);
		SessionView {
			game: 1,
			size: state.size,
			board: renderer.view().clone(),
			owners: state.owners.clone(),
			status: StatusLine { text: String::new(), tone: Tone::Neutral },
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
		}
	}

	#[test]
	fn board_draws_slashes_and_markers() {
		let state = GameState::blank(2)
			.with_cell(CellCoord::new(0, 1), Some(Slash::R), Some(Side::Human))
			.with_constraint(Node::new(1, 1), 2, 1);
		let view = view_of(&state);
		let theme = Theme::default();
		let layout = BoardLayout { x: 0, y: 0, size: 2 };
		let area = layout.area();
		let mut buf = Buffer::empty(area);

		BoardWidget::new(&view, &theme, layout).render(area, &mut buf);

		assert_eq!(buf[(0, 0)].symbol(), "+");
		assert_eq!(buf[(1, 0)].symbol(), "─");
		assert_eq!(buf[(0, 1)].symbol(), "│");
		assert_eq!(buf[(4, 2)].symbol(), "2");
		assert_eq!(buf[(6, 1)].symbol(), "╱");
		assert_eq!(buf[(2, 1)].symbol(), " ");
	}

	#[test]
	fn overlay_area_is_centered_and_clamped() {
		let area = OverlayWidget::area(Rect::new(0, 0, 30, 20));
		assert_eq!(area, Rect::new(0, 6, 30, 8));
	}
}
