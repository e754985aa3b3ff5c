use std::fmt;

use serde::{Deserialize, Serialize};

use crate::net::error::TransportError;
use crate::state::{CellCoord, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
	NewGame,
	Move,
	CpuMove,
	Undo,
	Solve,
	SetStrategy,
}

impl Endpoint {
	pub fn path(&self) -> &'static str {
		match self {
			Endpoint::NewGame => "new_game",
			Endpoint::Move => "move",
			Endpoint::CpuMove => "cpu_move",
			Endpoint::Undo => "undo",
			Endpoint::Solve => "solve",
			Endpoint::SetStrategy => "set_strategy",
		}
	}
}

impl fmt::Display for Endpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.path())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
	L,
	R,
	#[serde(rename = "CLEAR")]
	Clear,
}

impl MoveKind {
	pub fn label(&self) -> &'static str {
		match self {
			MoveKind::L => "L",
			MoveKind::R => "R",
			MoveKind::Clear => "CLEAR",
		}
	}
}

/// Greedy strategy id understood by the opponent, 1 through 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Strategy(u8);

impl Strategy {
	pub const MIN: u8 = 1;
	pub const MAX: u8 = 3;

	pub fn new(id: u8) -> Option<Self> {
		(Self::MIN..=Self::MAX).contains(&id).then_some(Self(id))
	}

	pub fn id(&self) -> u8 {
		self.0
	}

	pub fn next(&self) -> Self {
		if self.0 >= Self::MAX { Self(Self::MIN) } else { Self(self.0 + 1) }
	}

	pub fn prev(&self) -> Self {
		if self.0 <= Self::MIN { Self(Self::MAX) } else { Self(self.0 - 1) }
	}
}

impl Default for Strategy {
	fn default() -> Self {
		Self(Self::MIN)
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct NewGameRequest {
	pub size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveRequest {
	pub row: usize,
	pub col: usize,
	#[serde(rename = "type")]
	pub kind: MoveKind,
}

impl MoveRequest {
	pub fn new(cell: CellCoord, kind: MoveKind) -> Self {
		Self { row: cell.row, col: cell.col, kind }
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyRequest {
	pub strategy: Strategy,
}

#[derive(Debug, Deserialize)]
pub struct MoveBody {
	#[serde(default)]
	pub error: Option<String>,
	#[serde(default)]
	pub state: Option<GameState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CpuMoveRecord {
	pub row: usize,
	pub col: usize,
	#[serde(rename = "type")]
	pub kind: Option<MoveKind>,
}

#[derive(Debug, Deserialize)]
pub struct CpuMoveBody {
	#[serde(default)]
	pub success: bool,
	#[serde(default)]
	pub cpu_move: Option<CpuMoveRecord>,
	#[serde(default)]
	pub state: Option<GameState>,
	#[serde(default)]
	pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UndoBody {
	#[serde(default)]
	pub success: bool,
	#[serde(default)]
	pub state: Option<GameState>,
}

#[derive(Debug, Deserialize)]
pub struct SolveBody {
	#[serde(default)]
	pub success: bool,
	#[serde(default)]
	pub state: Option<GameState>,
	#[serde(default)]
	pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StrategyBody {
	#[serde(default)]
	pub success: bool,
}

/// Outcome of a completed move call. Transport failures never reach here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveReply {
	Accepted(GameState),
	Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuMoveReply {
	pub moved: bool,
	pub placed: Option<CpuMoveRecord>,
	pub state: Option<GameState>,
	pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoReply {
	pub applied: bool,
	pub state: Option<GameState>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveReply {
	pub solved: bool,
	pub state: Option<GameState>,
	pub message: Option<String>,
}

fn missing_state(endpoint: Endpoint) -> TransportError {
	TransportError::Malformed {
		endpoint,
		reason: "success reply without a state".to_string(),
	}
}

impl TryFrom<MoveBody> for MoveReply {
	type Error = TransportError;

	fn try_from(body: MoveBody) -> Result<Self, Self::Error> {
		match (body.error, body.state) {
			(Some(error), _) => Ok(MoveReply::Rejected(error)),
			(None, Some(state)) => Ok(MoveReply::Accepted(state)),
			(None, None) => Err(missing_state(Endpoint::Move)),
		}
	}
}

impl TryFrom<CpuMoveBody> for CpuMoveReply {
	type Error = TransportError;

	fn try_from(body: CpuMoveBody) -> Result<Self, Self::Error> {
		if !body.success {
			return Ok(CpuMoveReply {
				moved: false,
				placed: None,
				state: None,
				message: body.message,
			});
		}
		let state = body.state.ok_or_else(|| missing_state(Endpoint::CpuMove))?;
		Ok(CpuMoveReply {
			moved: body.cpu_move.is_some(),
			placed: body.cpu_move,
			state: Some(state),
			message: body.message,
		})
	}
}

impl TryFrom<UndoBody> for UndoReply {
	type Error = TransportError;

	fn try_from(body: UndoBody) -> Result<Self, Self::Error> {
		if !body.success {
			return Ok(UndoReply { applied: false, state: None });
		}
		let state = body.state.ok_or_else(|| missing_state(Endpoint::Undo))?;
		Ok(UndoReply { applied: true, state: Some(state) })
	}
}

impl TryFrom<SolveBody> for SolveReply {
	type Error = TransportError;

	fn try_from(body: SolveBody) -> Result<Self, Self::Error> {
		if !body.success {
			return Ok(SolveReply { solved: false, state: None, message: body.message });
		}
		let state = body.state.ok_or_else(|| missing_state(Endpoint::Solve))?;
		Ok(SolveReply { solved: true, state: Some(state), message: body.message })
	}
}
