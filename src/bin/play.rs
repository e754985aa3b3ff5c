use std::io::{self, stdout, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
	event::{
		self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
		MouseButton, MouseEventKind,
	},
	execute,
	terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use slant_client::config::{load_client_config, load_client_config_auto, parse_client_config, ClientConfig};
use slant_client::defaults;
use slant_client::logging::{self, tui as log};
use slant_client::net::GameClient;
use slant_client::outcome::Cue;
use slant_client::session::{self, Session, SessionEvent, SessionSettings, SessionUpdate};
use slant_client::theme::{Theme, DEFAULT_THEME};
use slant_client::tui::{GameUI, GameUIAction};

#[derive(Parser)]
#[command(name = "slant")]
#[command(about = "Play slant against a puzzle server")]
struct Cli {
	/// Base URL of the game API
	#[arg(short, long, env = "SLANT_SERVER")]
	server: Option<String>,

	/// Board size for the first game
	#[arg(short = 'n', long)]
	size: Option<usize>,

	#[arg(short, long)]
	config: Option<String>,

	#[arg(short, long, env = "SLANT_THEME")]
	theme: Option<String>,
}

fn load_config(cli: &Cli) -> ClientConfig {
	let loaded = match &cli.config {
		Some(path) => load_client_config(path),
		None => load_client_config_auto(),
	};
	let mut config = match loaded {
		Ok(config) => config,
		Err(e) => {
			if cli.config.is_some() {
				eprintln!("{}; using built-in settings", e);
			}
			defaults::bundled_client_config()
				.and_then(|content| parse_client_config(content).ok())
				.unwrap_or_default()
		}
	};

	if let Some(url) = &cli.server {
		config.server.url = url.clone();
	}
	if let Some(size) = cli.size {
		config.board.default_size = size;
	}
	config
}

fn main() -> io::Result<()> {
	let cli = Cli::parse();

	defaults::ensure_config();
	let config = load_config(&cli);

	let theme_name = cli.theme.as_deref().unwrap_or(DEFAULT_THEME).to_string();
	let theme = Theme::load(Some(&theme_name));

	logging::init("logs");
	log::event(&format!("starting against {}", config.server.url));

	let runtime = tokio::runtime::Runtime::new()?;

	let (event_tx, event_rx) = mpsc::unbounded_channel();
	let (update_tx, update_rx) = mpsc::unbounded_channel();

	let client = GameClient::new(config.server.url.clone(), config.server.timeout());
	let session = Session::new(
		Arc::new(client),
		SessionSettings::from(&config),
		event_tx.clone(),
		update_tx,
	);
	let session_task = runtime.spawn(session::run(session, event_rx));

	let size = config.board.default_size;
	let _ = event_tx.send(SessionEvent::NewGame(size));
	let mut ui = GameUI::new(theme, theme_name, config.board.clone(), size);

	enable_raw_mode()?;
	let mut stdout = stdout();
	execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_app(&mut terminal, &mut ui, &event_tx, update_rx);

	let _ = event_tx.send(SessionEvent::Shutdown);
	let _ = runtime.block_on(session_task);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	log::event("exit");
	result
}

fn run_app(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	ui: &mut GameUI,
	events: &UnboundedSender<SessionEvent>,
	mut updates: UnboundedReceiver<SessionUpdate>,
) -> io::Result<()> {
	loop {
		while let Ok(update) = updates.try_recv() {
			if let Some(cue) = ui.apply_update(update) {
				play_cue(cue)?;
			}
		}

		terminal.draw(|f| ui.render(f))?;

		if !event::poll(Duration::from_millis(30))? {
			continue;
		}

		let action = match event::read()? {
			Event::Key(key) => {
				if key.kind != KeyEventKind::Press {
					continue;
				}
				if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
					return Ok(());
				}
				ui.handle_key(key.code)
			}
			Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
				ui.handle_click(mouse.column, mouse.row)
			}
			_ => GameUIAction::None,
		};

		match action {
			GameUIAction::Send(event) => {
				if events.send(event).is_err() {
					log::event("session closed");
					return Ok(());
				}
			}
			GameUIAction::Quit => return Ok(()),
			GameUIAction::None => {}
		}
	}
}

fn play_cue(cue: Cue) -> io::Result<()> {
	if cue == Cue::Error {
		let mut out = io::stdout();
		out.write_all(b"\x07")?;
		out.flush()?;
	}
	Ok(())
}
