use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::logging;
use crate::state::{GameState, Side, Status};
use crate::timer::TimerSlot;

pub const DEFAULT_CPU_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scheduling {
	/// A schedule that was still pending got cancelled.
	pub superseded: bool,
	pub scheduled: Option<u64>,
}

/// Times the automated opponent's move. At most one schedule is pending;
/// any successful human move cancels it before deciding whether to arm a
/// new one.
#[derive(Debug)]
pub struct TurnScheduler {
	delay: Duration,
	timer: TimerSlot,
}

impl TurnScheduler {
	pub fn new(delay: Duration) -> Self {
		Self { delay, timer: TimerSlot::new() }
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}

	pub fn wants_cpu_move(state: &GameState, opponent_enabled: bool) -> bool {
		opponent_enabled && state.status == Status::Running && state.turn == Side::Cpu
	}

	pub fn after_human_move<E, F>(
		&mut self,
		state: &GameState,
		opponent_enabled: bool,
		tx: &UnboundedSender<E>,
		event: F,
	) -> Scheduling
	where
		E: Send + 'static,
		F: FnOnce(u64) -> E,
	{
		let superseded = self.cancel();
		let scheduled = Self::wants_cpu_move(state, opponent_enabled)
			.then(|| self.schedule_in(self.delay, tx, event));
		Scheduling { superseded, scheduled }
	}

	/// Arms a CPU move after `delay`, replacing any pending one.
	pub fn schedule_in<E, F>(&mut self, delay: Duration, tx: &UnboundedSender<E>, event: F) -> u64
	where
		E: Send + 'static,
		F: FnOnce(u64) -> E,
	{
		let generation = self.timer.arm(delay, tx, event);
		logging::session::scheduled(generation, delay.as_millis() as u64);
		generation
	}

	pub fn cancel(&mut self) -> bool {
		let generation = self.timer.generation();
		let cancelled = self.timer.cancel();
		if cancelled {
			logging::session::superseded(generation);
		}
		cancelled
	}

	/// True when `generation` is the live schedule; consumes it.
	pub fn take_due(&mut self, generation: u64) -> bool {
		let due = self.timer.fire(generation);
		if !due {
			logging::session::stale("cpu", generation);
		}
		due
	}

	pub fn is_pending(&self) -> bool {
		self.timer.is_armed()
	}
}

impl Default for TurnScheduler {
	fn default() -> Self {
		Self::new(DEFAULT_CPU_DELAY)
	}
}
