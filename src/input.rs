use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::logging;
use crate::state::CellCoord;
use crate::timer::TimerSlot;

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
	Toggle(CellCoord),
	Clear(CellCoord),
}

impl Intent {
	pub fn cell(&self) -> CellCoord {
		match self {
			Intent::Toggle(cell) | Intent::Clear(cell) => *cell,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
	cell: CellCoord,
	count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
	pub count: u32,
	/// A different cell whose classification was dropped unfired.
	pub superseded: Option<CellCoord>,
	pub generation: u64,
}

/// Turns raw activations into one classified intent per burst.
///
/// Every activation restarts the window. When the window elapses without
/// another activation, one activation means toggle and two or more mean
/// clear. An activation on a different cell throws the pending one away.
#[derive(Debug)]
pub struct InputDisambiguator {
	window: Duration,
	pending: Option<Pending>,
	timer: TimerSlot,
}

impl InputDisambiguator {
	pub fn new(window: Duration) -> Self {
		Self {
			window,
			pending: None,
			timer: TimerSlot::new(),
		}
	}

	pub fn activate<E, F>(&mut self, cell: CellCoord, tx: &UnboundedSender<E>, event: F) -> Activation
	where
		E: Send + 'static,
		F: FnOnce(u64) -> E,
	{
		let (count, superseded) = match self.pending {
			Some(p) if p.cell == cell => (p.count + 1, None),
			Some(p) => (1, Some(p.cell)),
			None => (1, None),
		};
		if let Some(old) = superseded {
			logging::input::superseded(old);
		}

		self.pending = Some(Pending { cell, count });
		let generation = self.timer.arm(self.window, tx, event);
		logging::input::activation(cell, count);

		Activation { count, superseded, generation }
	}

	/// Called when a window elapses. Stale generations yield nothing.
	pub fn expire(&mut self, generation: u64) -> Option<Intent> {
		if !self.timer.fire(generation) {
			return None;
		}
		let pending = self.pending.take()?;
		let intent = if pending.count >= 2 {
			Intent::Clear(pending.cell)
		} else {
			Intent::Toggle(pending.cell)
		};
		logging::input::intent(&intent);
		Some(intent)
	}

	pub fn reset(&mut self) {
		self.timer.cancel();
		self.pending = None;
	}

	pub fn pending(&self) -> Option<(CellCoord, u32)> {
		self.pending.map(|p| (p.cell, p.count))
	}
}

impl Default for InputDisambiguator {
	fn default() -> Self {
		Self::new(DEFAULT_WINDOW)
	}
}
