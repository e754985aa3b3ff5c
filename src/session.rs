use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::config::ClientConfig;
use crate::input::{InputDisambiguator, Intent};
use crate::logging;
use crate::moves::{self, CycleOutcome};
use crate::net::{GameService, Strategy};
use crate::outcome::{self, Cue, OverlayChange, OverlayContent, OverlayTracker, Tone};
use crate::render::{BoardRenderer, BoardView, Geometry};
use crate::scheduler::TurnScheduler;
use crate::state::{CellCoord, GameState, Scores, Side, StateStore, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
	NewGame(usize),
	Activate(CellCoord),
	Undo,
	Solve,
	SetStrategy(Strategy),
	CloseOverlay,
	ClickWindowElapsed(u64),
	CpuDue(u64),
	RevealOverlay(u64),
	Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
	pub debounce: Duration,
	pub cpu_delay: Duration,
	pub strategy_kickoff: Duration,
	pub overlay_delay: Duration,
	pub geometry: Geometry,
	pub strategy: Strategy,
}

impl Default for SessionSettings {
	fn default() -> Self {
		Self::from(&ClientConfig::default())
	}
}

impl From<&ClientConfig> for SessionSettings {
	fn from(config: &ClientConfig) -> Self {
		Self {
			debounce: Duration::from_millis(config.timing.debounce_ms),
			cpu_delay: Duration::from_millis(config.timing.cpu_delay_ms),
			strategy_kickoff: Duration::from_millis(config.timing.strategy_kickoff_ms),
			overlay_delay: Duration::from_millis(config.timing.overlay_delay_ms),
			geometry: Geometry {
				cell_extent: config.board.cell_extent,
				gap: config.board.gap,
			},
			strategy: config.opponent.strategy(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
	pub text: String,
	pub tone: Tone,
}

impl StatusLine {
	fn new(text: impl Into<String>, tone: Tone) -> Self {
		Self { text: text.into(), tone }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpponentView {
	pub enabled: bool,
	pub strategy: Strategy,
	/// False while a loop is showing or the game is over.
	pub toggle_available: bool,
}

/// Everything the front-end draws, cloned out after each event.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
	pub game: u32,
	pub size: usize,
	pub board: BoardView,
	pub owners: Vec<Vec<Option<Side>>>,
	pub status: StatusLine,
	pub overlay: Option<OverlayContent>,
	pub scores: Scores,
	pub opponent: OpponentView,
	pub changed: Vec<CellCoord>,
	pub pending_cpu: bool,
	pub pending_cell: Option<(CellCoord, u32)>,
}

impl SessionView {
	pub fn owner(&self, cell: CellCoord) -> Option<Side> {
		self.owners.get(cell.row).and_then(|row| row.get(cell.col)).copied().flatten()
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
	View(Box<SessionView>),
	Cue(Cue),
}

/// Owns everything mutable about one play session and processes events
/// one at a time. Timers post back into the same event queue, so a timer
/// firing never interleaves with an operation in progress.
pub struct Session {
	service: Arc<dyn GameService>,
	settings: SessionSettings,
	store: StateStore,
	renderer: BoardRenderer,
	input: InputDisambiguator,
	scheduler: TurnScheduler,
	overlay: OverlayTracker,
	events: UnboundedSender<SessionEvent>,
	updates: UnboundedSender<SessionUpdate>,
	status: StatusLine,
	opponent_enabled: bool,
	strategy: Strategy,
	toggle_available: bool,
	changed: Vec<CellCoord>,
	game: u32,
}

impl Session {
	pub fn new(
		service: Arc<dyn GameService>,
		settings: SessionSettings,
		events: UnboundedSender<SessionEvent>,
		updates: UnboundedSender<SessionUpdate>,
	) -> Self {
		Self {
			service,
			renderer: BoardRenderer::new(settings.geometry),
			input: InputDisambiguator::new(settings.debounce),
			scheduler: TurnScheduler::new(settings.cpu_delay),
			overlay: OverlayTracker::new(settings.overlay_delay),
			strategy: settings.strategy,
			settings,
			store: StateStore::new(),
			events,
			updates,
			status: StatusLine::new("Press n to start a game", Tone::Neutral),
			opponent_enabled: false,
			toggle_available: true,
			changed: Vec::new(),
			game: 0,
		}
	}

	pub fn store(&self) -> &StateStore {
		&self.store
	}

	pub fn status(&self) -> &StatusLine {
		&self.status
	}

	pub fn overlay(&self) -> Option<&OverlayContent> {
		self.overlay.visible()
	}

	pub fn opponent_enabled(&self) -> bool {
		self.opponent_enabled
	}

	pub fn view(&self) -> SessionView {
		let current = self.store.current();
		SessionView {
			game: self.game,
			size: current.map(|s| s.size).unwrap_or(0),
			board: self.renderer.view().clone(),
			owners: current.map(|s| s.owners.clone()).unwrap_or_default(),
			status: self.status.clone(),
			overlay: self.overlay.visible().cloned(),
			scores: current.map(|s| s.scores).unwrap_or_default(),
			opponent: OpponentView {
				enabled: self.opponent_enabled,
				strategy: self.strategy,
				toggle_available: self.toggle_available,
			},
			changed: self.changed.clone(),
			pending_cpu: self.scheduler.is_pending(),
			pending_cell: self.input.pending(),
		}
	}

	/// Processes one event. Returns false once the session should stop.
	pub async fn handle(&mut self, event: SessionEvent) -> bool {
		self.changed.clear();
		match event {
			SessionEvent::NewGame(size) => self.new_game(size).await,
			SessionEvent::Activate(cell) => {
				self.input.activate(cell, &self.events, SessionEvent::ClickWindowElapsed);
			}
			SessionEvent::ClickWindowElapsed(generation) => {
				if let Some(intent) = self.input.expire(generation) {
					self.apply_intent(intent).await;
				}
			}
			SessionEvent::CpuDue(generation) => {
				if self.scheduler.take_due(generation) {
					self.cpu_move().await;
				}
			}
			SessionEvent::RevealOverlay(generation) => self.reveal_overlay(generation),
			SessionEvent::Undo => self.undo().await,
			SessionEvent::Solve => self.solve().await,
			SessionEvent::SetStrategy(strategy) => self.set_strategy(strategy).await,
			SessionEvent::CloseOverlay => {
				self.overlay.close();
			}
			SessionEvent::Shutdown => {
				self.cancel_timers();
				return false;
			}
		}
		self.publish();
		true
	}

	fn publish(&self) {
		let _ = self.updates.send(SessionUpdate::View(Box::new(self.view())));
	}

	fn cue(&self, cue: Cue) {
		let _ = self.updates.send(SessionUpdate::Cue(cue));
	}

	fn set_status(&mut self, text: impl Into<String>, tone: Tone) {
		self.status = StatusLine::new(text, tone);
		logging::session::status(&self.status.text);
	}

	fn cancel_timers(&mut self) {
		self.input.reset();
		self.scheduler.cancel();
		self.overlay.reset();
	}

	/// Makes `state` current and brings the board, status line and
	/// overlay in line with it.
	fn adopt(&mut self, state: GameState, source: &str) {
		self.store.replace(state);
		logging::session::adopted(source, self.store.version());
		let Some(state) = self.store.current() else {
			return;
		};

		let report = self.renderer.render(state);
		let outcome = outcome::classify(state);
		let change = self.overlay.apply(
			state.status,
			&outcome.overlay,
			&self.events,
			SessionEvent::RevealOverlay,
		);

		self.changed = report.changed_cells();
		self.toggle_available = outcome.opponent_toggle;
		self.set_status(outcome.text, outcome.tone);
		if change == OverlayChange::Opened {
			if let Some(cue) = outcome.cue {
				self.cue(cue);
			}
		}
	}

	fn reveal_overlay(&mut self, generation: u64) {
		if !self.overlay.reveal(generation) {
			return;
		}
		if let Some(cue) = self.store.current().and_then(|s| outcome::classify(s).cue) {
			self.cue(cue);
		}
	}

	async fn new_game(&mut self, size: usize) {
		self.cancel_timers();
		match self.service.new_game(size).await {
			Ok(state) => {
				self.game += 1;
				logging::set_game(self.game);
				self.adopt(state, "new_game");
				self.set_status("Player Turn", Tone::HumanTurn);
				self.cue(Cue::Click);
			}
			Err(_) => self.set_status("Error connecting to backend.", Tone::Alert),
		}
	}

	async fn apply_intent(&mut self, intent: Intent) {
		match moves::run(self.service.as_ref(), &self.store, intent).await {
			CycleOutcome::Refused(_) => {}
			CycleOutcome::Accepted { state, .. } => {
				self.adopt(state, "move");
				match intent {
					Intent::Toggle(_) => self.cue(Cue::Click),
					Intent::Clear(_) => {
						self.cue(Cue::Clear);
						self.set_status("Cell Cleared", Tone::Notice);
					}
				}
				self.after_human_move(matches!(intent, Intent::Toggle(_)));
			}
			CycleOutcome::Rejected { message, .. } => {
				self.set_status(message, Tone::Alert);
				self.cue(Cue::Error);
			}
			CycleOutcome::Transport(e) => {
				self.set_status(format!("Error: {}", e), Tone::Alert);
			}
		}
	}

	fn after_human_move(&mut self, prompt_single_player: bool) {
		let Some(state) = self.store.current() else {
			return;
		};
		let scheduling = self.scheduler.after_human_move(
			state,
			self.opponent_enabled,
			&self.events,
			SessionEvent::CpuDue,
		);
		let prompt = prompt_single_player
			&& !self.opponent_enabled
			&& state.status == Status::Running
			&& !state.has_loop();

		if scheduling.scheduled.is_some() {
			self.set_status("CPU Turn - Processing...", Tone::CpuTurn);
		} else if prompt {
			self.set_status("Player Turn - Click to Place Slash", Tone::Prompt);
		}
	}

	/// A replaced board invalidates any pending CPU schedule; arm a fresh
	/// one only if the new board still waits on the CPU.
	fn rearm_cpu_turn(&mut self) {
		self.scheduler.cancel();
		let cpu_turn = self
			.store
			.current()
			.is_some_and(|s| TurnScheduler::wants_cpu_move(s, self.opponent_enabled));
		if cpu_turn {
			self.scheduler.schedule_in(self.settings.cpu_delay, &self.events, SessionEvent::CpuDue);
		}
	}

	async fn cpu_move(&mut self) {
		self.set_status("CPU Processing - Evaluating Moves...", Tone::CpuTurn);
		self.publish();

		match self.service.cpu_move().await {
			Ok(reply) => {
				if let Some(state) = reply.state {
					self.adopt(state, "cpu_move");
				}
				if reply.moved {
					self.cue(Cue::Cpu);
				} else if let Some(message) = reply.message {
					self.set_status(message, Tone::Notice);
				}
			}
			Err(_) => self.set_status("CPU Processing Error", Tone::Alert),
		}
	}

	async fn undo(&mut self) {
		match self.service.undo().await {
			Ok(reply) => match reply.state {
				Some(state) if reply.applied => {
					self.adopt(state, "undo");
					self.rearm_cpu_turn();
					self.set_status("Last Move Reverted", Tone::Notice);
					self.cue(Cue::Clear);
				}
				_ => self.set_status("No Moves to Undo", Tone::Notice),
			},
			Err(e) => self.set_status(format!("Error: {}", e), Tone::Alert),
		}
	}

	async fn solve(&mut self) {
		self.set_status("Solving Puzzle...", Tone::Notice);
		self.publish();

		match self.service.solve().await {
			Ok(reply) => match reply.state {
				Some(state) if reply.solved => {
					self.adopt(state, "solve");
					self.rearm_cpu_turn();
					let text = reply.message.unwrap_or_else(|| "Puzzle Solved Successfully".to_string());
					self.set_status(text, Tone::Notice);
					self.cue(Cue::Cpu);
				}
				_ => {
					let text = reply.message.unwrap_or_else(|| "No Solution Found".to_string());
					self.set_status(text, Tone::Alert);
					self.cue(Cue::Error);
				}
			},
			Err(_) => self.set_status("Solution Algorithm Error", Tone::Alert),
		}
	}

	async fn set_strategy(&mut self, strategy: Strategy) {
		match self.service.set_strategy(strategy).await {
			Ok(true) => {
				self.opponent_enabled = true;
				self.strategy = strategy;
				self.set_status(
					format!("Multiplayer Mode: Strategy {} Selected", strategy.id()),
					Tone::Victory,
				);
				let cpu_turn = self
					.store
					.current()
					.map(|s| TurnScheduler::wants_cpu_move(s, true))
					.unwrap_or(false);
				if cpu_turn {
					self.scheduler.schedule_in(
						self.settings.strategy_kickoff,
						&self.events,
						SessionEvent::CpuDue,
					);
				}
				self.cue(Cue::Cpu);
			}
			Ok(false) | Err(_) => self.set_status("Error setting strategy", Tone::Alert),
		}
	}
}

/// Drives a session until it is told to shut down or every sender is gone.
pub async fn run(mut session: Session, mut events: UnboundedReceiver<SessionEvent>) {
	while let Some(event) = events.recv().await {
		if !session.handle(event).await {
			break;
		}
	}
}
