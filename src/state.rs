use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slash {
	L,
	R,
}

impl Slash {
	pub fn glyph(&self) -> char {
		match self {
			Slash::L => '╲',
			Slash::R => '╱',
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
	Human,
	Cpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
	Running,
	WinHuman,
	WinCpu,
	Draw,
	Completed,
	FilledInvalid,
	#[serde(other)]
	Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
	pub row: usize,
	pub col: usize,
}

impl CellCoord {
	pub fn new(row: usize, col: usize) -> Self {
		Self { row, col }
	}
}

impl fmt::Display for CellCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.row, self.col)
	}
}

/// A crossing on the `(size + 1) x (size + 1)` lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node {
	pub row: usize,
	pub col: usize,
}

impl Node {
	pub fn new(row: usize, col: usize) -> Self {
		Self { row, col }
	}
}

impl FromStr for Node {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let inner = s.trim().trim_start_matches('(').trim_end_matches(')');
		let mut parts = inner.split(',');
		let (Some(row), Some(col), None) = (parts.next(), parts.next(), parts.next()) else {
			return Err(format!("bad node key '{}'", s));
		};
		let row = row.trim().parse::<usize>().map_err(|e| format!("bad node key '{}': {}", s, e))?;
		let col = col.trim().parse::<usize>().map_err(|e| format!("bad node key '{}': {}", s, e))?;
		Ok(Self { row, col })
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Scores {
	#[serde(rename = "HUMAN", default)]
	pub human: u32,
	#[serde(rename = "CPU", default)]
	pub cpu: u32,
}

/// A complete server-confirmed snapshot. Never edited locally; every
/// accepted operation replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "WireState")]
pub struct GameState {
	pub size: usize,
	pub grid: Vec<Vec<Option<Slash>>>,
	pub constraints: BTreeMap<Node, u8>,
	pub node_degrees: BTreeMap<Node, u8>,
	pub owners: Vec<Vec<Option<Side>>>,
	pub loop_cells: BTreeSet<CellCoord>,
	pub status: Status,
	pub turn: Side,
	pub scores: Scores,
}

impl GameState {
	/// An all-empty running board with the human to move.
	pub fn blank(size: usize) -> Self {
		Self {
			size,
			grid: vec![vec![None; size]; size],
			constraints: BTreeMap::new(),
			node_degrees: BTreeMap::new(),
			owners: vec![vec![None; size]; size],
			loop_cells: BTreeSet::new(),
			status: Status::Running,
			turn: Side::Human,
			scores: Scores::default(),
		}
	}

	pub fn with_cell(mut self, cell: CellCoord, slash: Option<Slash>, owner: Option<Side>) -> Self {
		self.grid[cell.row][cell.col] = slash;
		self.owners[cell.row][cell.col] = owner;
		self
	}

	pub fn with_constraint(mut self, node: Node, required: u8, degree: u8) -> Self {
		self.constraints.insert(node, required);
		if degree > 0 {
			self.node_degrees.insert(node, degree);
		}
		self
	}

	pub fn with_status(mut self, status: Status, turn: Side) -> Self {
		self.status = status;
		self.turn = turn;
		self
	}

	pub fn with_scores(mut self, human: u32, cpu: u32) -> Self {
		self.scores = Scores { human, cpu };
		self
	}

	pub fn with_loop(mut self, cells: impl IntoIterator<Item = CellCoord>) -> Self {
		self.loop_cells = cells.into_iter().collect();
		self
	}

	pub fn cell_count(&self) -> usize {
		self.size * self.size
	}

	pub fn contains(&self, cell: CellCoord) -> bool {
		cell.row < self.size && cell.col < self.size
	}

	pub fn cell(&self, cell: CellCoord) -> Option<Slash> {
		self.grid.get(cell.row).and_then(|row| row.get(cell.col)).copied().flatten()
	}

	pub fn owner(&self, cell: CellCoord) -> Option<Side> {
		self.owners.get(cell.row).and_then(|row| row.get(cell.col)).copied().flatten()
	}

	pub fn degree(&self, node: Node) -> u8 {
		self.node_degrees.get(&node).copied().unwrap_or(0)
	}

	pub fn has_loop(&self) -> bool {
		!self.loop_cells.is_empty()
	}

	pub fn in_loop(&self, cell: CellCoord) -> bool {
		self.loop_cells.contains(&cell)
	}
}

/// The state exactly as the service sends it, before validation.
#[derive(Debug, Deserialize)]
pub struct WireState {
	size: usize,
	grid: Vec<Vec<Option<Slash>>>,
	#[serde(default)]
	constraints: HashMap<String, u8>,
	#[serde(default)]
	node_degrees: HashMap<String, u8>,
	#[serde(default)]
	owners: Option<Vec<Vec<Option<Side>>>>,
	#[serde(default)]
	loop_cells: Vec<(usize, usize)>,
	status: Status,
	#[serde(default = "default_turn")]
	turn: Side,
	#[serde(default)]
	scores: Scores,
}

fn default_turn() -> Side {
	Side::Human
}

fn lattice_map(raw: HashMap<String, u8>, size: usize, field: &str) -> Result<BTreeMap<Node, u8>, String> {
	let mut out = BTreeMap::new();
	for (key, value) in raw {
		let node: Node = key.parse()?;
		if node.row > size || node.col > size {
			return Err(format!("{} key {} is off the {}x{} lattice", field, key, size + 1, size + 1));
		}
		out.insert(node, value);
	}
	Ok(out)
}

/// Largest board the client accepts from the service.
pub const MAX_BOARD_SIZE: usize = 64;

fn square<T>(rows: &[Vec<T>], size: usize) -> bool {
	rows.len() == size && rows.iter().all(|row| row.len() == size)
}

impl TryFrom<WireState> for GameState {
	type Error = String;

	fn try_from(wire: WireState) -> Result<Self, Self::Error> {
		let size = wire.size;
		if size == 0 {
			return Err("board size must be positive".to_string());
		}
		if size > MAX_BOARD_SIZE {
			return Err(format!("board size {} exceeds {}", size, MAX_BOARD_SIZE));
		}
		if !square(&wire.grid, size) {
			return Err(format!("grid is not {}x{}", size, size));
		}

		let owners = wire.owners.unwrap_or_else(|| vec![vec![None; size]; size]);
		if !square(&owners, size) {
			return Err(format!("owners is not {}x{}", size, size));
		}

		let constraints = lattice_map(wire.constraints, size, "constraints")?;
		let node_degrees = lattice_map(wire.node_degrees, size, "node_degrees")?;

		let mut loop_cells = BTreeSet::new();
		for (row, col) in wire.loop_cells {
			if row >= size || col >= size {
				return Err(format!("loop cell ({}, {}) is off the board", row, col));
			}
			loop_cells.insert(CellCoord { row, col });
		}

		Ok(Self {
			size,
			grid: wire.grid,
			constraints,
			node_degrees,
			owners,
			loop_cells,
			status: wire.status,
			turn: wire.turn,
			scores: wire.scores,
		})
	}
}

/// Holds the last server-confirmed state. Only successful-response
/// handlers write to it.
#[derive(Debug, Default)]
pub struct StateStore {
	current: Option<GameState>,
	version: u64,
}

impl StateStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn current(&self) -> Option<&GameState> {
		self.current.as_ref()
	}

	pub fn replace(&mut self, state: GameState) -> &GameState {
		self.version += 1;
		self.current.insert(state)
	}

	/// Bumped on every replacement.
	pub fn version(&self) -> u64 {
		self.version
	}

	/// CPU-placed cells are off limits to the human side.
	pub fn is_locked(&self, cell: CellCoord) -> bool {
		self.current
			.as_ref()
			.map(|s| s.owner(cell) == Some(Side::Cpu))
			.unwrap_or(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"{
		"size": 2,
		"grid": [["L", null], [null, "R"]],
		"constraints": {"0,0": 1, "(2, 2)": 1},
		"node_degrees": {"0,0": 1, "1,1": 2},
		"owners": [["HUMAN", null], [null, "CPU"]],
		"loop_cells": [],
		"status": "RUNNING",
		"turn": "CPU",
		"scores": {"HUMAN": 3, "CPU": 1},
		"graph": {"0,0": ["1,1"]}
	}"#;

	#[test]
	fn test_decode_full_state() {
		let state: GameState = serde_json::from_str(SAMPLE).unwrap();

		assert_eq!(state.size, 2);
		assert_eq!(state.cell(CellCoord::new(0, 0)), Some(Slash::L));
		assert_eq!(state.cell(CellCoord::new(0, 1)), None);
		assert_eq!(state.cell(CellCoord::new(1, 1)), Some(Slash::R));
		assert_eq!(state.constraints.get(&Node::new(2, 2)), Some(&1));
		assert_eq!(state.degree(Node::new(1, 1)), 2);
		assert_eq!(state.degree(Node::new(0, 2)), 0);
		assert_eq!(state.owner(CellCoord::new(1, 1)), Some(Side::Cpu));
		assert_eq!(state.turn, Side::Cpu);
		assert_eq!(state.scores, Scores { human: 3, cpu: 1 });
	}

	#[test]
	fn test_decode_terminal_statuses() {
		for (raw, status) in [
			("WIN_HUMAN", Status::WinHuman),
			("WIN_CPU", Status::WinCpu),
			("DRAW", Status::Draw),
			("COMPLETED", Status::Completed),
			("FILLED_INVALID", Status::FilledInvalid),
			("PAUSED", Status::Unknown),
		] {
			let json = format!(r#"{{"size":1,"grid":[[null]],"status":"{}"}}"#, raw);
			let state: GameState = serde_json::from_str(&json).unwrap();
			assert_eq!(state.status, status);
		}
	}

	#[test]
	fn test_missing_owners_and_scores_default() {
		let json = r#"{"size":1,"grid":[[null]],"status":"RUNNING"}"#;
		let state: GameState = serde_json::from_str(json).unwrap();

		assert_eq!(state.owner(CellCoord::new(0, 0)), None);
		assert_eq!(state.scores, Scores::default());
		assert_eq!(state.turn, Side::Human);
	}

	#[test]
	fn test_reject_grid_size_mismatch() {
		let json = r#"{"size":2,"grid":[[null,null]],"status":"RUNNING"}"#;
		assert!(serde_json::from_str::<GameState>(json).is_err());
	}

	#[test]
	fn test_reject_oversized_board() {
		let json = r#"{"size":100000,"grid":[],"status":"RUNNING"}"#;
		let err = serde_json::from_str::<GameState>(json).unwrap_err();
		assert!(err.to_string().contains("exceeds"));
	}

	#[test]
	fn test_reject_off_lattice_constraint() {
		let json = r#"{"size":1,"grid":[[null]],"constraints":{"3,0":1},"status":"RUNNING"}"#;
		assert!(serde_json::from_str::<GameState>(json).is_err());
	}

	#[test]
	fn test_reject_loop_cell_off_board() {
		let json = r#"{"size":1,"grid":[[null]],"loop_cells":[[1,0]],"status":"RUNNING"}"#;
		assert!(serde_json::from_str::<GameState>(json).is_err());
	}

	#[test]
	fn test_node_key_parsing() {
		assert_eq!("3,4".parse::<Node>(), Ok(Node::new(3, 4)));
		assert_eq!("(3, 4)".parse::<Node>(), Ok(Node::new(3, 4)));
		assert!("3".parse::<Node>().is_err());
		assert!("3,4,5".parse::<Node>().is_err());
		assert!("a,b".parse::<Node>().is_err());
	}

	#[test]
	fn test_store_replace_bumps_version() {
		let mut store = StateStore::new();
		assert!(store.current().is_none());
		assert_eq!(store.version(), 0);

		store.replace(GameState::blank(3));
		store.replace(GameState::blank(5));

		assert_eq!(store.version(), 2);
		assert_eq!(store.current().map(|s| s.size), Some(5));
	}

	#[test]
	fn test_store_lock_follows_latest_state() {
		let cell = CellCoord::new(1, 1);
		let mut store = StateStore::new();
		assert!(!store.is_locked(cell));

		store.replace(GameState::blank(3).with_cell(cell, Some(Slash::L), Some(Side::Cpu)));
		assert!(store.is_locked(cell));

		store.replace(GameState::blank(3).with_cell(cell, Some(Slash::L), Some(Side::Human)));
		assert!(!store.is_locked(cell));
	}
}
