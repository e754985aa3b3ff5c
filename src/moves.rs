use crate::input::Intent;
use crate::logging;
use crate::net::{GameService, MoveKind, MoveReply, TransportError};
use crate::state::{GameState, Slash, StateStore, Status};

/// Ordered candidates for an intent on a cell currently holding `current`.
///
/// A toggle tries the other orientation first and keeps the current one as
/// a fallback, so a rejected change never empties the cell. Note the order
/// is not a rotation: both an empty cell and an `R` cell lead with `L`.
pub fn candidates(current: Option<Slash>, intent: &Intent) -> Vec<MoveKind> {
	match intent {
		Intent::Clear(_) => vec![MoveKind::Clear],
		Intent::Toggle(_) => match current {
			None => vec![MoveKind::L, MoveKind::R],
			Some(Slash::L) => vec![MoveKind::R, MoveKind::L],
			Some(Slash::R) => vec![MoveKind::L, MoveKind::R],
		},
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
	NoGame,
	OffBoard,
	CpuOwned,
	StatusNotAllowed,
}

impl Refusal {
	pub fn reason(&self) -> &'static str {
		match self {
			Refusal::NoGame => "no game",
			Refusal::OffBoard => "off board",
			Refusal::CpuOwned => "cpu owned",
			Refusal::StatusNotAllowed => "status not allowed",
		}
	}
}

#[derive(Debug)]
pub enum CycleOutcome {
	/// Guard tripped; nothing was sent.
	Refused(Refusal),
	Accepted {
		state: GameState,
		kind: MoveKind,
		attempts: usize,
	},
	/// Every candidate was rejected; carries the last message.
	Rejected {
		message: String,
		attempts: usize,
	},
	Transport(TransportError),
}

/// The ownership guard, checked against whatever the store holds right now.
/// Toggles also need a status the client recognises; clears do not.
pub fn check_guard<'a>(store: &'a StateStore, intent: &Intent) -> Result<&'a GameState, Refusal> {
	let cell = intent.cell();
	let state = store.current().ok_or(Refusal::NoGame)?;
	if !state.contains(cell) {
		return Err(Refusal::OffBoard);
	}
	if store.is_locked(cell) {
		return Err(Refusal::CpuOwned);
	}
	if matches!(intent, Intent::Toggle(_)) && state.status == Status::Unknown {
		return Err(Refusal::StatusNotAllowed);
	}
	Ok(state)
}

/// Submits the candidates for one intent strictly one after another.
pub async fn run(service: &dyn GameService, store: &StateStore, intent: Intent) -> CycleOutcome {
	let cell = intent.cell();
	let state = match check_guard(store, &intent) {
		Ok(state) => state,
		Err(refusal) => {
			logging::session::refused(cell, refusal.reason());
			return CycleOutcome::Refused(refusal);
		}
	};

	let order = candidates(state.cell(cell), &intent);
	let mut last_rejection = String::new();

	for (i, kind) in order.iter().enumerate() {
		match service.submit_move(cell, *kind).await {
			Ok(MoveReply::Accepted(state)) => {
				return CycleOutcome::Accepted { state, kind: *kind, attempts: i + 1 };
			}
			Ok(MoveReply::Rejected(message)) => {
				logging::session::rejected(cell, kind.label(), &message);
				last_rejection = message;
			}
			Err(e) => return CycleOutcome::Transport(e),
		}
	}

	CycleOutcome::Rejected { message: last_rejection, attempts: order.len() }
}
