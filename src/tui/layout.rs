use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::state::{CellCoord, Node};

/// Terminal columns per cell, including the lattice column to its left.
pub const CELL_WIDTH: u16 = 4;
/// Terminal rows per cell, including the lattice row above it.
pub const CELL_HEIGHT: u16 = 2;

/// Where the board sits on screen. Lattice nodes land on every
/// `CELL_WIDTH`th column and every `CELL_HEIGHT`th row from the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
	pub x: u16,
	pub y: u16,
	pub size: usize,
}

impl BoardLayout {
	pub fn extent(size: usize) -> (u16, u16) {
		let size = u16::try_from(size).unwrap_or(u16::MAX);
		(
			size.saturating_mul(CELL_WIDTH).saturating_add(1),
			size.saturating_mul(CELL_HEIGHT).saturating_add(1),
		)
	}

	/// Centres a board of `size` cells in `area`.
	pub fn centered(area: Rect, size: usize) -> Self {
		let (w, h) = Self::extent(size);
		Self {
			x: area.x + area.width.saturating_sub(w) / 2,
			y: area.y + area.height.saturating_sub(h) / 2,
			size,
		}
	}

	pub fn area(&self) -> Rect {
		let (w, h) = Self::extent(self.size);
		Rect::new(self.x, self.y, w, h)
	}

	pub fn node_position(&self, node: Node) -> (u16, u16) {
		(
			self.x + node.col as u16 * CELL_WIDTH,
			self.y + node.row as u16 * CELL_HEIGHT,
		)
	}

	/// First column of the glyph area inside a cell, and its row.
	pub fn cell_position(&self, cell: CellCoord) -> (u16, u16) {
		(
			self.x + cell.col as u16 * CELL_WIDTH + 1,
			self.y + cell.row as u16 * CELL_HEIGHT + 1,
		)
	}

	/// The cell under a terminal position, if any. Positions on lattice
	/// lines belong to no cell.
	pub fn hit(&self, column: u16, row: u16) -> Option<CellCoord> {
		let dx = column.checked_sub(self.x)?;
		let dy = row.checked_sub(self.y)?;
		if dx % CELL_WIDTH == 0 || dy % CELL_HEIGHT == 0 {
			return None;
		}
		let cell = CellCoord::new((dy / CELL_HEIGHT) as usize, (dx / CELL_WIDTH) as usize);
		(cell.row < self.size && cell.col < self.size).then_some(cell)
	}

	/// The lattice node under a terminal position, if any.
	pub fn node_at(&self, column: u16, row: u16) -> Option<Node> {
		let dx = column.checked_sub(self.x)?;
		let dy = row.checked_sub(self.y)?;
		if dx % CELL_WIDTH != 0 || dy % CELL_HEIGHT != 0 {
			return None;
		}
		let node = Node::new((dy / CELL_HEIGHT) as usize, (dx / CELL_WIDTH) as usize);
		(node.row <= self.size && node.col <= self.size).then_some(node)
	}
}

pub struct ScreenLayout {
	pub header: Rect,
	pub board: Rect,
	pub status: Rect,
	pub footer: Rect,
}

impl ScreenLayout {
	pub fn compute(area: Rect) -> Self {
		let rows = Layout::default()
			.direction(Direction::Vertical)
			.constraints([
				Constraint::Length(3),
				Constraint::Min(5),
				Constraint::Length(3),
				Constraint::Length(1),
			])
			.split(area);

		Self {
			header: rows[0],
			board: rows[1],
			status: rows[2],
			footer: rows[3],
		}
	}
}
