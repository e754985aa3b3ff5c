use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::net::client::GameService;
use crate::net::error::TransportError;
use crate::net::protocol::*;
use crate::state::{CellCoord, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
	NewGame(usize),
	Move(CellCoord, MoveKind),
	CpuMove,
	Undo,
	Solve,
	SetStrategy(u8),
}

/// In-memory stand-in for the remote service. Replies are queued per
/// operation and every request is recorded. With an empty queue it falls
/// back to a blank board for new games, a rejection for moves and
/// "nothing happened" for the rest.
pub struct ScriptedService {
	calls: Mutex<Vec<Call>>,
	new_games: Mutex<VecDeque<Result<GameState, TransportError>>>,
	moves: Mutex<VecDeque<Result<MoveReply, TransportError>>>,
	cpu_moves: Mutex<VecDeque<Result<CpuMoveReply, TransportError>>>,
	undos: Mutex<VecDeque<Result<UndoReply, TransportError>>>,
	solves: Mutex<VecDeque<Result<SolveReply, TransportError>>>,
	strategies: Mutex<VecDeque<Result<bool, TransportError>>>,
}

impl Default for ScriptedService {
	fn default() -> Self {
		Self::new()
	}
}

impl ScriptedService {
	pub fn new() -> Self {
		Self {
			calls: Mutex::new(Vec::new()),
			new_games: Mutex::new(VecDeque::new()),
			moves: Mutex::new(VecDeque::new()),
			cpu_moves: Mutex::new(VecDeque::new()),
			undos: Mutex::new(VecDeque::new()),
			solves: Mutex::new(VecDeque::new()),
			strategies: Mutex::new(VecDeque::new()),
		}
	}

	pub fn queue_new_game(&self, reply: Result<GameState, TransportError>) {
		lock(&self.new_games).push_back(reply);
	}

	pub fn queue_move(&self, reply: Result<MoveReply, TransportError>) {
		lock(&self.moves).push_back(reply);
	}

	pub fn accept_move(&self, state: GameState) {
		self.queue_move(Ok(MoveReply::Accepted(state)));
	}

	pub fn reject_move(&self, message: &str) {
		self.queue_move(Ok(MoveReply::Rejected(message.to_string())));
	}

	pub fn queue_cpu_move(&self, reply: Result<CpuMoveReply, TransportError>) {
		lock(&self.cpu_moves).push_back(reply);
	}

	pub fn queue_undo(&self, reply: Result<UndoReply, TransportError>) {
		lock(&self.undos).push_back(reply);
	}

	pub fn queue_solve(&self, reply: Result<SolveReply, TransportError>) {
		lock(&self.solves).push_back(reply);
	}

	pub fn queue_strategy(&self, reply: Result<bool, TransportError>) {
		lock(&self.strategies).push_back(reply);
	}

	pub fn calls(&self) -> Vec<Call> {
		lock(&self.calls).clone()
	}

	pub fn move_calls(&self) -> Vec<(CellCoord, MoveKind)> {
		self.calls()
			.into_iter()
			.filter_map(|c| match c {
				Call::Move(cell, kind) => Some((cell, kind)),
				_ => None,
			})
			.collect()
	}

	pub fn cpu_move_count(&self) -> usize {
		self.calls().iter().filter(|c| matches!(c, Call::CpuMove)).count()
	}

	pub fn clear_calls(&self) {
		lock(&self.calls).clear();
	}

	fn record(&self, call: Call) {
		lock(&self.calls).push(call);
	}

	/// A connection-level failure for tests that need one.
	pub fn unreachable(endpoint: Endpoint) -> TransportError {
		TransportError::Status { endpoint, status: 503 }
	}
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl GameService for ScriptedService {
	async fn new_game(&self, size: usize) -> Result<GameState, TransportError> {
		self.record(Call::NewGame(size));
		lock(&self.new_games)
			.pop_front()
			.unwrap_or_else(|| Ok(GameState::blank(size)))
	}

	async fn submit_move(&self, cell: CellCoord, kind: MoveKind) -> Result<MoveReply, TransportError> {
		self.record(Call::Move(cell, kind));
		lock(&self.moves)
			.pop_front()
			.unwrap_or_else(|| Ok(MoveReply::Rejected("no scripted reply".to_string())))
	}

	async fn cpu_move(&self) -> Result<CpuMoveReply, TransportError> {
		self.record(Call::CpuMove);
		lock(&self.cpu_moves).pop_front().unwrap_or_else(|| {
			Ok(CpuMoveReply {
				moved: false,
				placed: None,
				state: None,
				message: Some("Not CPU turn".to_string()),
			})
		})
	}

	async fn undo(&self) -> Result<UndoReply, TransportError> {
		self.record(Call::Undo);
		lock(&self.undos)
			.pop_front()
			.unwrap_or_else(|| Ok(UndoReply { applied: false, state: None }))
	}

	async fn solve(&self) -> Result<SolveReply, TransportError> {
		self.record(Call::Solve);
		lock(&self.solves)
			.pop_front()
			.unwrap_or_else(|| Ok(SolveReply { solved: false, state: None, message: None }))
	}

	async fn set_strategy(&self, strategy: Strategy) -> Result<bool, TransportError> {
		self.record(Call::SetStrategy(strategy.id()));
		lock(&self.strategies).pop_front().unwrap_or(Ok(true))
	}
}
