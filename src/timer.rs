use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// One cancellable delayed event. Arming aborts whatever was armed before
/// and hands out a new generation; a delivery only counts if it carries
/// the generation that is still armed.
#[derive(Debug, Default)]
pub struct TimerSlot {
	generation: u64,
	armed: bool,
	handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sends `event(generation)` on `tx` after `delay`. Must be called
	/// from within a tokio runtime.
	pub fn arm<E, F>(&mut self, delay: Duration, tx: &UnboundedSender<E>, event: F) -> u64
	where
		E: Send + 'static,
		F: FnOnce(u64) -> E,
	{
		self.cancel();
		let generation = self.generation;
		let message = event(generation);
		let tx = tx.clone();
		self.handle = Some(tokio::spawn(async move {
			tokio::time::sleep(delay).await;
			let _ = tx.send(message);
		}));
		self.armed = true;
		generation
	}

	/// Returns whether something was armed.
	pub fn cancel(&mut self) -> bool {
		let was_armed = self.armed;
		if let Some(handle) = self.handle.take() {
			handle.abort();
		}
		self.armed = false;
		self.generation += 1;
		was_armed
	}

	/// Consumes a delivery; true only for the live generation.
	pub fn fire(&mut self, generation: u64) -> bool {
		if self.armed && generation == self.generation {
			self.armed = false;
			self.handle = None;
			true
		} else {
			false
		}
	}

	pub fn is_armed(&self) -> bool {
		self.armed
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}
}

impl Drop for TimerSlot {
	fn drop(&mut self) {
		if let Some(handle) = self.handle.take() {
			handle.abort();
		}
	}
}
