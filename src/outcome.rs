use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::logging;
use crate::state::{GameState, Side, Status};
use crate::timer::TimerSlot;

pub const DEFAULT_OVERLAY_DELAY: Duration = Duration::from_millis(100);

pub const LOOP_TEXT: &str = "Cycle Detected - Invalid Configuration";
pub const FILLED_INVALID_TEXT: &str = "Game Completed - Invalid Board State";

/// Colour class of the status line. The theme maps each to a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
	HumanTurn,
	CpuTurn,
	Prompt,
	Loop,
	Victory,
	Defeat,
	Draw,
	Invalid,
	Notice,
	Alert,
	Neutral,
}

/// Audio feedback requested from the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
	Click,
	Clear,
	Cpu,
	Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContent {
	pub heading: String,
	pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayAction {
	None,
	/// Open unless already open; a repeat of the same status is ignored.
	Open(OverlayContent),
	/// Open now, replacing whatever is showing.
	ForceOpen(OverlayContent),
	Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
	pub text: String,
	pub tone: Tone,
	pub opponent_toggle: bool,
	pub overlay: OverlayAction,
	pub cue: Option<Cue>,
}

impl Outcome {
	fn running(text: &str, tone: Tone, opponent_toggle: bool) -> Self {
		Self {
			text: text.to_string(),
			tone,
			opponent_toggle,
			overlay: OverlayAction::Close,
			cue: None,
		}
	}

	fn scored(state: &GameState, heading: &str, message: &str, tone: Tone, cue: Option<Cue>) -> Self {
		let message = format!(
			"{} Final Score: {} - {}",
			message, state.scores.human, state.scores.cpu
		);
		Self {
			text: heading.to_string(),
			tone,
			opponent_toggle: false,
			overlay: OverlayAction::Open(OverlayContent { heading: heading.to_string(), message }),
			cue,
		}
	}
}

/// Maps a confirmed state to what the status line, the opponent toggle and
/// the overlay should show. Pure; the overlay's one-shot behaviour lives in
/// [`OverlayTracker`].
pub fn classify(state: &GameState) -> Outcome {
	match state.status {
		Status::Running if state.has_loop() => Outcome::running(LOOP_TEXT, Tone::Loop, false),
		Status::Running => match state.turn {
			Side::Human => Outcome::running("Player Turn", Tone::HumanTurn, true),
			Side::Cpu => Outcome::running("CPU Processing...", Tone::CpuTurn, true),
		},
		Status::WinHuman => Outcome::scored(
			state,
			"✓ Victory",
			"Greedy algorithm completed successfully.",
			Tone::Victory,
			Some(Cue::Cpu),
		),
		Status::WinCpu => Outcome::scored(
			state,
			"AI Victory",
			"CPU greedy algorithm outperformed player.",
			Tone::Defeat,
			Some(Cue::Error),
		),
		Status::Draw => Outcome::scored(
			state,
			"Draw",
			"Both algorithms achieved equal performance.",
			Tone::Draw,
			None,
		),
		Status::Completed => Outcome::scored(
			state,
			"Puzzle Complete",
			"All constraints satisfied.",
			Tone::Victory,
			None,
		),
		Status::FilledInvalid => Outcome {
			text: FILLED_INVALID_TEXT.to_string(),
			tone: Tone::Invalid,
			opponent_toggle: false,
			overlay: OverlayAction::ForceOpen(OverlayContent {
				heading: "Game Over".to_string(),
				message: "Board filled with constraint violations. Greedy algorithm limitations encountered."
					.to_string(),
			}),
			cue: Some(Cue::Error),
		},
		Status::Unknown => Outcome::running("Waiting for server", Tone::Neutral, false),
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
	Hidden,
	Revealing(OverlayContent),
	Shown(OverlayContent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayChange {
	Unchanged,
	/// A reveal was armed; it arrives as the given generation.
	Scheduled(u64),
	Opened,
	Closed,
}

/// Applies [`OverlayAction`]s so that the overlay opens once per transition
/// into a terminal status. Terminal overlays are revealed after a short
/// delay; forced overlays open at once.
#[derive(Debug)]
pub struct OverlayTracker {
	delay: Duration,
	phase: Phase,
	last_status: Option<Status>,
	timer: TimerSlot,
}

impl OverlayTracker {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			phase: Phase::Hidden,
			last_status: None,
			timer: TimerSlot::new(),
		}
	}

	pub fn apply<E, F>(
		&mut self,
		status: Status,
		action: &OverlayAction,
		tx: &UnboundedSender<E>,
		event: F,
	) -> OverlayChange
	where
		E: Send + 'static,
		F: FnOnce(u64) -> E,
	{
		let repeated = self.last_status == Some(status);
		self.last_status = Some(status);

		match action {
			OverlayAction::None => OverlayChange::Unchanged,
			OverlayAction::Open(content) => {
				if repeated || self.phase != Phase::Hidden {
					return OverlayChange::Unchanged;
				}
				let generation = self.timer.arm(self.delay, tx, event);
				self.phase = Phase::Revealing(content.clone());
				logging::session::overlay(&format!("reveal #{} '{}'", generation, content.heading));
				OverlayChange::Scheduled(generation)
			}
			OverlayAction::ForceOpen(content) => {
				self.timer.cancel();
				self.phase = Phase::Shown(content.clone());
				logging::session::overlay(&format!("forced '{}'", content.heading));
				OverlayChange::Opened
			}
			OverlayAction::Close => {
				if self.close() {
					OverlayChange::Closed
				} else {
					OverlayChange::Unchanged
				}
			}
		}
	}

	/// A reveal timer elapsed. True when the overlay actually opened.
	pub fn reveal(&mut self, generation: u64) -> bool {
		if !self.timer.fire(generation) {
			logging::session::stale("overlay", generation);
			return false;
		}
		match std::mem::replace(&mut self.phase, Phase::Hidden) {
			Phase::Revealing(content) => {
				logging::session::overlay(&format!("shown '{}'", content.heading));
				self.phase = Phase::Shown(content);
				true
			}
			other => {
				self.phase = other;
				false
			}
		}
	}

	/// Hides the overlay and drops any pending reveal. Returns whether
	/// anything was showing or pending.
	pub fn close(&mut self) -> bool {
		self.timer.cancel();
		let was_open = self.phase != Phase::Hidden;
		self.phase = Phase::Hidden;
		was_open
	}

	/// Forgets the last status too, so the next terminal state opens again.
	pub fn reset(&mut self) {
		self.close();
		self.last_status = None;
	}

	pub fn visible(&self) -> Option<&OverlayContent> {
		match &self.phase {
			Phase::Shown(content) => Some(content),
			_ => None,
		}
	}

	pub fn is_pending(&self) -> bool {
		matches!(self.phase, Phase::Revealing(_))
	}
}

impl Default for OverlayTracker {
	fn default() -> Self {
		Self::new(DEFAULT_OVERLAY_DELAY)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::state::CellCoord;
	use tokio::sync::mpsc;

	fn with_status(status: Status) -> GameState {
		GameState::blank(3).with_status(status, Side::Human).with_scores(10, 7)
	}

	#[test]
	fn running_text_follows_turn() {
		let human = classify(&GameState::blank(3));
		assert_eq!(human.text, "Player Turn");
		assert_eq!(human.tone, Tone::HumanTurn);
		assert!(human.opponent_toggle);

		let cpu = classify(&GameState::blank(3).with_status(Status::Running, Side::Cpu));
		assert_eq!(cpu.text, "CPU Processing...");
		assert_eq!(cpu.tone, Tone::CpuTurn);
	}

	#[test]
	fn loop_disables_toggle_without_overlay() {
		let state = GameState::blank(3).with_loop([CellCoord::new(0, 0)]);
		let outcome = classify(&state);
		assert_eq!(outcome.text, LOOP_TEXT);
		assert_eq!(outcome.tone, Tone::Loop);
		assert!(!outcome.opponent_toggle);
		assert!(!matches!(outcome.overlay, OverlayAction::Open(_) | OverlayAction::ForceOpen(_)));
	}

	#[test]
	fn win_embeds_both_scores() {
		let outcome = classify(&with_status(Status::WinHuman));
		assert_eq!(outcome.text, "✓ Victory");
		assert!(!outcome.opponent_toggle);
		assert_eq!(outcome.cue, Some(Cue::Cpu));
		match outcome.overlay {
			OverlayAction::Open(content) => {
				assert_eq!(
					content.message,
					"Greedy algorithm completed successfully. Final Score: 10 - 7"
				);
			}
			other => panic!("expected open, got {:?}", other),
		}
	}

	#[test]
	fn every_scored_status_opens() {
		for (status, heading) in [
			(Status::WinCpu, "AI Victory"),
			(Status::Draw, "Draw"),
			(Status::Completed, "Puzzle Complete"),
		] {
			let outcome = classify(&with_status(status));
			assert_eq!(outcome.text, heading);
			assert!(matches!(outcome.overlay, OverlayAction::Open(ref c) if c.heading == heading));
			assert!(!outcome.opponent_toggle);
		}
	}

	#[test]
	fn filled_invalid_forces_overlay() {
		let outcome = classify(&with_status(Status::FilledInvalid));
		assert_eq!(outcome.text, FILLED_INVALID_TEXT);
		assert_eq!(outcome.cue, Some(Cue::Error));
		assert!(matches!(outcome.overlay, OverlayAction::ForceOpen(ref c) if c.heading == "Game Over"));
	}

	#[test]
	fn unknown_status_closes() {
		let outcome = classify(&with_status(Status::Unknown));
		assert_eq!(outcome.overlay, OverlayAction::Close);
		assert!(!outcome.opponent_toggle);
	}

	fn open_action(status: Status) -> OverlayAction {
		classify(&with_status(status)).overlay
	}

	#[tokio::test(start_paused = true)]
	async fn terminal_overlay_reveals_after_delay_once() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let mut tracker = OverlayTracker::default();
		let action = open_action(Status::WinHuman);

		let change = tracker.apply(Status::WinHuman, &action, &tx, |g| g);
		let OverlayChange::Scheduled(generation) = change else {
			panic!("expected a scheduled reveal, got {:?}", change);
		};
		assert!(tracker.visible().is_none());

		assert_eq!(rx.recv().await, Some(generation));
		assert!(tracker.reveal(generation));
		assert_eq!(tracker.visible().unwrap().heading, "✓ Victory");

		assert_eq!(tracker.apply(Status::WinHuman, &action, &tx, |g| g), OverlayChange::Unchanged);
	}

	#[tokio::test(start_paused = true)]
	async fn dismissed_overlay_stays_closed_on_refresh() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let mut tracker = OverlayTracker::default();
		let action = open_action(Status::Draw);

		tracker.apply(Status::Draw, &action, &tx, |g| g);
		let generation = rx.recv().await.unwrap();
		tracker.reveal(generation);
		assert!(tracker.close());

		assert_eq!(tracker.apply(Status::Draw, &action, &tx, |g| g), OverlayChange::Unchanged);
		assert!(tracker.visible().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn new_transition_reopens() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let mut tracker = OverlayTracker::default();
		let action = open_action(Status::Completed);

		tracker.apply(Status::Completed, &action, &tx, |g| g);
		tracker.reveal(rx.recv().await.unwrap());
		tracker.apply(Status::Running, &OverlayAction::Close, &tx, |g| g);
		assert!(tracker.visible().is_none());

		let change = tracker.apply(Status::Completed, &action, &tx, |g| g);
		assert!(matches!(change, OverlayChange::Scheduled(_)));
	}

	#[tokio::test(start_paused = true)]
	async fn close_before_reveal_cancels_it() {
		let (tx, mut rx) = mpsc::unbounded_channel();
		let mut tracker = OverlayTracker::default();

		let change = tracker.apply(Status::WinCpu, &open_action(Status::WinCpu), &tx, |g| g);
		let OverlayChange::Scheduled(generation) = change else {
			panic!("expected a scheduled reveal");
		};
		assert_eq!(tracker.apply(Status::Running, &OverlayAction::Close, &tx, |g| g), OverlayChange::Closed);

		tokio::time::sleep(Duration::from_secs(1)).await;
		assert!(rx.try_recv().is_err());
		assert!(!tracker.reveal(generation));
		assert!(tracker.visible().is_none());
	}

	#[tokio::test(start_paused = true)]
	async fn forced_overlay_replaces_content_every_time() {
		let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
		let mut tracker = OverlayTracker::default();

		tracker.apply(Status::WinHuman, &open_action(Status::WinHuman), &tx, |g| g);
		let forced = open_action(Status::FilledInvalid);
		assert_eq!(tracker.apply(Status::FilledInvalid, &forced, &tx, |g| g), OverlayChange::Opened);
		assert_eq!(tracker.visible().unwrap().heading, "Game Over");

		tracker.close();
		assert_eq!(tracker.apply(Status::FilledInvalid, &forced, &tx, |g| g), OverlayChange::Opened);

		tokio::time::sleep(Duration::from_secs(1)).await;
		assert!(rx.try_recv().is_err());
	}
}
