use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;

struct LogState {
	dir: Option<PathBuf>,
	file: Option<fs::File>,
	current_date: String,
	game: u32,
}

static LOG_STATE: Mutex<LogState> = Mutex::new(LogState {
	dir: None,
	file: None,
	current_date: String::new(),
	game: 0,
});

/// Turns logging on. Until this is called every log call is a no-op.
pub fn init(dir: impl AsRef<Path>) {
	if let Ok(mut state) = LOG_STATE.lock() {
		state.dir = Some(dir.as_ref().to_path_buf());
		state.file = None;
	}
}

pub fn set_game(game: u32) {
	if let Ok(mut state) = LOG_STATE.lock() {
		state.game = game;
	}
}

fn ensure_log_file(state: &mut LogState) {
	let Some(dir) = state.dir.clone() else {
		return;
	};
	let date = Local::now().format("%Y-%m-%d").to_string();
	if state.current_date != date || state.file.is_none() {
		let _ = fs::create_dir_all(&dir);
		let path = dir.join(format!("slant-{}.log", date));
		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
			state.file = Some(file);
			state.current_date = date;
		}
	}
}

pub fn log(module: &str, log_type: &str, message: &str) {
	if let Ok(mut state) = LOG_STATE.lock() {
		if state.dir.is_none() {
			return;
		}
		ensure_log_file(&mut state);

		let line = format!(
			"[{}][game {}][{}:{}] {}\n",
			Local::now().format("%H:%M:%S%.3f"),
			state.game,
			module,
			log_type,
			message
		);

		if let Some(ref mut file) = state.file {
			let _ = file.write_all(line.as_bytes());
			let _ = file.flush();
		}
	}
}

pub mod client {
	use super::log;
	use crate::net::Endpoint;

	pub fn request(endpoint: Endpoint) {
		log("Client", "REQUEST", &format!("POST {}", endpoint));
	}

	pub fn response(endpoint: Endpoint, status: u16) {
		log("Client", "RESPONSE", &format!("{} -> {}", endpoint, status));
	}

	pub fn transport(endpoint: Endpoint, detail: &str) {
		log("Client", "TRANSPORT", &format!("{}: {}", endpoint, detail));
	}
}

pub mod input {
	use super::log;
	use crate::input::Intent;
	use crate::state::CellCoord;

	pub fn activation(cell: CellCoord, count: u32) {
		log("Input", "ACTIVATION", &format!("{} x{}", cell, count));
	}

	pub fn intent(intent: &Intent) {
		match intent {
			Intent::Toggle(cell) => log("Input", "INTENT", &format!("toggle {}", cell)),
			Intent::Clear(cell) => log("Input", "INTENT", &format!("clear {}", cell)),
		}
	}

	pub fn superseded(cell: CellCoord) {
		log("Input", "SUPERSEDED", &format!("{} dropped", cell));
	}
}

pub mod session {
	use super::log;
	use crate::state::CellCoord;

	pub fn adopted(source: &str, version: u64) {
		log("Session", "ADOPTED", &format!("{} v{}", source, version));
	}

	pub fn refused(cell: CellCoord, reason: &str) {
		log("Session", "REFUSED", &format!("{}: {}", cell, reason));
	}

	pub fn rejected(cell: CellCoord, kind: &str, message: &str) {
		log("Session", "REJECTED", &format!("{} {}: {}", cell, kind, message));
	}

	pub fn scheduled(generation: u64, delay_ms: u64) {
		log("Session", "SCHEDULED", &format!("cpu #{} in {}ms", generation, delay_ms));
	}

	pub fn superseded(generation: u64) {
		log("Session", "SUPERSEDED", &format!("cpu #{}", generation));
	}

	pub fn stale(what: &str, generation: u64) {
		log("Session", "STALE", &format!("{} #{}", what, generation));
	}

	pub fn overlay(msg: &str) {
		log("Session", "OVERLAY", msg);
	}

	pub fn status(text: &str) {
		log("Session", "STATUS", text);
	}
}

pub mod tui {
	use super::log;

	pub fn key(key: &str) {
		log("TUI", "KEY", key);
	}

	pub fn click(column: u16, row: u16) {
		log("TUI", "CLICK", &format!("{},{}", column, row));
	}

	pub fn event(msg: &str) {
		log("TUI", "EVENT", msg);
	}
}

