use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};

use slant_client::net::{Call, CpuMoveReply, MoveKind, ScriptedService, Strategy};
use slant_client::outcome::Cue;
use slant_client::session::{self, Session, SessionEvent, SessionSettings, SessionUpdate, SessionView};
use slant_client::state::{CellCoord, GameState, Side, Slash, Status};

struct Running {
	service: Arc<ScriptedService>,
	events: UnboundedSender<SessionEvent>,
	updates: UnboundedReceiver<SessionUpdate>,
	cues: Vec<Cue>,
	task: JoinHandle<()>,
}

impl Running {
	fn spawn() -> Self {
		let service = Arc::new(ScriptedService::new());
		let (events, events_rx) = mpsc::unbounded_channel();
		let (updates_tx, updates) = mpsc::unbounded_channel();
		let session = Session::new(service.clone(), SessionSettings::default(), events.clone(), updates_tx);
		let task = tokio::spawn(session::run(session, events_rx));
		Self { service, events, updates, cues: Vec::new(), task }
	}

	fn send(&self, event: SessionEvent) {
		self.events.send(event).unwrap();
	}

	/// Reads updates until a view satisfies `pred`. Cues seen on the way
	/// are kept for later assertions.
	async fn wait_for(&mut self, pred: impl Fn(&SessionView) -> bool) -> SessionView {
		let updates = &mut self.updates;
		let cues = &mut self.cues;
		timeout(Duration::from_secs(60), async {
			loop {
				match updates.recv().await.expect("session ended") {
					SessionUpdate::View(view) if pred(&view) => return *view,
					SessionUpdate::View(_) => {}
					SessionUpdate::Cue(cue) => cues.push(cue),
				}
			}
		})
		.await
		.expect("no matching view")
	}

	async fn shutdown(self) {
		self.send(SessionEvent::Shutdown);
		self.task.await.unwrap();
	}
}

fn at(r: usize, c: usize) -> CellCoord {
	CellCoord::new(r, c)
}

fn placed(cells: &[(CellCoord, Slash, Side)], turn: Side) -> GameState {
	cells
		.iter()
		.fold(GameState::blank(5), |s, &(cell, slash, side)| s.with_cell(cell, Some(slash), Some(side)))
		.with_status(Status::Running, turn)
}

#[tokio::test(start_paused = true)]
async fn new_game_shows_empty_board() {
	let mut run = Running::spawn();
	run.service.queue_new_game(Ok(GameState::blank(5)));

	run.send(SessionEvent::NewGame(5));
	let view = run.wait_for(|v| v.size == 5).await;

	assert_eq!(view.board.cells.len(), 25);
	assert!(view.board.cells.iter().all(|c| c.slash.is_none()));
	assert!(view.board.markers.is_empty());
	assert_eq!(view.status.text, "Player Turn");
	run.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn rejected_orientation_falls_back_without_error() {
	let mut run = Running::spawn();
	run.service.queue_new_game(Ok(GameState::blank(5)));
	run.send(SessionEvent::NewGame(5));
	run.wait_for(|v| v.size == 5).await;

	run.service.reject_move("node degree exceeded");
	run.service.accept_move(placed(&[(at(2, 2), Slash::R, Side::Human)], Side::Human));
	run.send(SessionEvent::Activate(at(2, 2)));

	let view = run.wait_for(|v| v.board.cell(at(2, 2)).and_then(|c| c.slash).is_some()).await;
	assert_eq!(view.board.cell(at(2, 2)).unwrap().slash, Some(Slash::R));
	assert_eq!(
		run.service.move_calls(),
		vec![(at(2, 2), MoveKind::L), (at(2, 2), MoveKind::R)]
	);
	assert!(!run.cues.contains(&Cue::Error));
	run.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn double_click_sends_a_single_clear() {
	let mut run = Running::spawn();
	run.service.queue_new_game(Ok(placed(&[(at(1, 3), Slash::L, Side::Human)], Side::Human)));
	run.send(SessionEvent::NewGame(5));
	run.wait_for(|v| v.size == 5).await;

	run.service.accept_move(GameState::blank(5));
	run.send(SessionEvent::Activate(at(1, 3)));
	run.send(SessionEvent::Activate(at(1, 3)));

	run.wait_for(|v| v.status.text == "Cell Cleared").await;
	assert_eq!(run.service.move_calls(), vec![(at(1, 3), MoveKind::Clear)]);
	run.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn later_human_move_supersedes_pending_cpu_turn() {
	let mut run = Running::spawn();
	run.service.queue_new_game(Ok(GameState::blank(5)));
	run.send(SessionEvent::NewGame(5));
	run.wait_for(|v| v.size == 5).await;

	run.send(SessionEvent::SetStrategy(Strategy::new(2).unwrap()));
	run.wait_for(|v| v.opponent.enabled).await;

	let first = placed(&[(at(0, 0), Slash::L, Side::Human)], Side::Cpu);
	let second = placed(
		&[(at(0, 0), Slash::L, Side::Human), (at(4, 4), Slash::L, Side::Human)],
		Side::Cpu,
	);
	run.service.accept_move(first);
	run.service.accept_move(second.clone());

	run.send(SessionEvent::Activate(at(0, 0)));
	run.wait_for(|v| v.pending_cpu && v.board.cell(at(0, 0)).and_then(|c| c.slash).is_some()).await;

	run.send(SessionEvent::Activate(at(4, 4)));
	run.wait_for(|v| v.pending_cpu && v.board.cell(at(4, 4)).and_then(|c| c.slash).is_some()).await;
	let rescheduled = Instant::now();

	let after_cpu = second.with_cell(at(2, 2), Some(Slash::R), Some(Side::Cpu)).with_status(Status::Running, Side::Human);
	run.service.queue_cpu_move(Ok(CpuMoveReply {
		moved: true,
		placed: None,
		state: Some(after_cpu),
		message: None,
	}));

	let view = run.wait_for(|v| v.owner(at(2, 2)) == Some(Side::Cpu)).await;
	let waited = rescheduled.elapsed();

	assert_eq!(run.service.cpu_move_count(), 1);
	assert!(waited >= Duration::from_millis(1500));
	assert!(waited < Duration::from_millis(1600));
	assert!(!view.pending_cpu);
	run.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn human_win_reveals_scores_once() {
	let mut run = Running::spawn();
	run.service.queue_new_game(Ok(GameState::blank(5)));
	run.send(SessionEvent::NewGame(5));
	run.wait_for(|v| v.size == 5).await;

	let won = placed(&[(at(3, 1), Slash::R, Side::Human)], Side::Human)
		.with_status(Status::WinHuman, Side::Human)
		.with_scores(10, 7);
	run.service.accept_move(won);
	run.send(SessionEvent::Activate(at(3, 1)));

	let view = run.wait_for(|v| v.overlay.is_some()).await;
	let overlay = view.overlay.unwrap();
	assert!(overlay.message.contains("10 - 7"));
	assert!(!view.opponent.toggle_available);

	run.send(SessionEvent::CloseOverlay);
	let view = run.wait_for(|v| v.overlay.is_none()).await;
	assert_eq!(view.status.text, "✓ Victory");

	// Nothing else is scheduled, so the overlay stays closed.
	run.send(SessionEvent::Undo);
	let view = run.wait_for(|v| v.status.text == "No Moves to Undo").await;
	assert!(view.overlay.is_none());

	assert_eq!(
		run.service.calls().iter().filter(|c| matches!(c, Call::CpuMove)).count(),
		0
	);
	run.shutdown().await;
}
