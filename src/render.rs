use crate::state::{CellCoord, GameState, Node, Slash};

pub const DEFAULT_CELL_EXTENT: f32 = 60.0;
pub const DEFAULT_GAP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
	pub cell_extent: f32,
	pub gap: f32,
}

impl Geometry {
	/// Offset of lattice line `index`, centred in the gap before it.
	pub fn lattice_offset(&self, index: usize) -> f32 {
		index as f32 * (self.cell_extent + self.gap) - self.gap / 2.0
	}
}

impl Default for Geometry {
	fn default() -> Self {
		Self { cell_extent: DEFAULT_CELL_EXTENT, gap: DEFAULT_GAP }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMark {
	Neutral,
	Satisfied,
	Error,
}

impl MarkerMark {
	pub fn judge(current: u8, required: u8) -> Self {
		if current == required {
			MarkerMark::Satisfied
		} else if current > required {
			MarkerMark::Error
		} else {
			MarkerMark::Neutral
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
	pub node: Node,
	pub required: u8,
	pub current: u8,
	pub mark: MarkerMark,
	pub top: f32,
	pub left: f32,
	pub tooltip: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellView {
	pub slash: Option<Slash>,
	pub in_loop: bool,
}

/// What is on screen right now. Rebuilt as a side effect of rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardView {
	pub size: usize,
	pub cells: Vec<CellView>,
	pub markers: Vec<MarkerView>,
}

impl BoardView {
	pub fn cell(&self, cell: CellCoord) -> Option<&CellView> {
		if cell.row >= self.size || cell.col >= self.size {
			return None;
		}
		self.cells.get(cell.row * self.size + cell.col)
	}

	pub fn marker(&self, node: Node) -> Option<&MarkerView> {
		self.markers.iter().find(|m| m.node == node)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellTransition {
	Show { from: Option<Slash>, to: Slash },
	Hide { from: Slash },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderReport {
	pub rebuilt: bool,
	pub transitions: Vec<(CellCoord, CellTransition)>,
	pub markers_removed: usize,
	pub markers_added: usize,
}

impl RenderReport {
	pub fn changed_cells(&self) -> Vec<CellCoord> {
		self.transitions.iter().map(|(cell, _)| *cell).collect()
	}
}

/// Reconciles a [`BoardView`] with each confirmed state.
///
/// The cell grid is only rebuilt when the cell count no longer matches the
/// state; otherwise each cell gets the smallest change that makes it agree,
/// and untouched cells produce no transition. Loop highlighting is
/// recomputed every time. Markers are thrown away and regenerated on every
/// render.
#[derive(Debug, Default)]
pub struct BoardRenderer {
	geometry: Geometry,
	view: BoardView,
}

impl BoardRenderer {
	pub fn new(geometry: Geometry) -> Self {
		Self { geometry, view: BoardView::default() }
	}

	pub fn view(&self) -> &BoardView {
		&self.view
	}

	pub fn render(&mut self, state: &GameState) -> RenderReport {
		let mut report = RenderReport::default();
		let size = state.size;

		if self.view.cells.len() != state.cell_count() {
			self.view = BoardView {
				size,
				cells: vec![CellView::default(); state.cell_count()],
				markers: Vec::new(),
			};
			report.rebuilt = true;
		}

		for row in 0..size {
			for col in 0..size {
				let coord = CellCoord::new(row, col);
				let cell = &mut self.view.cells[row * size + col];
				if let Some(transition) = patch_cell(cell, state.cell(coord)) {
					report.transitions.push((coord, transition));
				}
				cell.in_loop = state.in_loop(coord);
			}
		}

		if !report.rebuilt {
			report.markers_removed = self.view.markers.len();
			self.view.markers.clear();
		}
		self.view.markers = state
			.constraints
			.iter()
			.map(|(node, required)| self.marker(state, *node, *required))
			.collect();
		report.markers_added = self.view.markers.len();

		report
	}

	fn marker(&self, state: &GameState, node: Node, required: u8) -> MarkerView {
		let current = state.degree(node);
		MarkerView {
			node,
			required,
			current,
			mark: MarkerMark::judge(current, required),
			top: self.geometry.lattice_offset(node.row),
			left: self.geometry.lattice_offset(node.col),
			tooltip: format!("Needs {} lines (Current: {})", required, current),
		}
	}
}

fn patch_cell(cell: &mut CellView, next: Option<Slash>) -> Option<CellTransition> {
	match (cell.slash, next) {
		(current, Some(to)) if current != Some(to) => {
			cell.slash = Some(to);
			Some(CellTransition::Show { from: current, to })
		}
		(Some(from), None) => {
			cell.slash = None;
			Some(CellTransition::Hide { from })
		}
		_ => None,
	}
}
