use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::net::Strategy;

pub const APP_DIR: &str = "slant-client";
pub const CLIENT_FILE: &str = "client.toml";

fn config_paths(filename: &str) -> Vec<PathBuf> {
	let mut paths = Vec::new();

	if let Some(config_dir) = dirs::config_dir() {
		paths.push(config_dir.join(APP_DIR).join(filename));
	}

	paths.push(PathBuf::from("config").join(filename));

	paths
}

fn find_config(filename: &str) -> Option<PathBuf> {
	config_paths(filename).into_iter().find(|p| p.exists())
}

pub fn resolve_config(filename: &str) -> Result<PathBuf, String> {
	find_config(filename).ok_or_else(|| {
		let searched: Vec<_> = config_paths(filename)
			.iter()
			.map(|p| p.display().to_string())
			.collect();
		format!("Config file '{}' not found. Searched: {}", filename, searched.join(", "))
	})
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
	pub url: String,
	pub timeout_ms: u64,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			url: "http://localhost:5000/api".to_string(),
			timeout_ms: 10_000,
		}
	}
}

impl ServerConfig {
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
	pub debounce_ms: u64,
	pub cpu_delay_ms: u64,
	pub strategy_kickoff_ms: u64,
	pub overlay_delay_ms: u64,
}

impl Default for TimingConfig {
	fn default() -> Self {
		Self {
			debounce_ms: 250,
			cpu_delay_ms: 1500,
			strategy_kickoff_ms: 1000,
			overlay_delay_ms: 100,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
	pub default_size: usize,
	pub sizes: Vec<usize>,
	pub cell_extent: f32,
	pub gap: f32,
}

impl Default for BoardConfig {
	fn default() -> Self {
		Self {
			default_size: 5,
			sizes: vec![5, 7, 10],
			cell_extent: 60.0,
			gap: 2.0,
		}
	}
}

impl BoardConfig {
	/// The size after `current` in the configured rotation.
	pub fn next_size(&self, current: usize) -> usize {
		match self.sizes.iter().position(|&s| s == current) {
			Some(i) => self.sizes[(i + 1) % self.sizes.len()],
			None => self.sizes.first().copied().unwrap_or(self.default_size),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
	#[serde(rename = "strategy")]
	pub strategy_id: u8,
}

impl Default for OpponentConfig {
	fn default() -> Self {
		Self { strategy_id: Strategy::MIN }
	}
}

impl OpponentConfig {
	/// Out-of-range ids fall back to the first strategy.
	pub fn strategy(&self) -> Strategy {
		Strategy::new(self.strategy_id).unwrap_or_default()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
	pub server: ServerConfig,
	pub timing: TimingConfig,
	pub board: BoardConfig,
	pub opponent: OpponentConfig,
}

impl ClientConfig {
	fn validate(self) -> Result<Self, String> {
		if self.board.default_size == 0 || self.board.sizes.contains(&0) {
			return Err("board sizes must be positive".to_string());
		}
		if self.timing.debounce_ms == 0 {
			return Err("timing.debounce_ms must be positive".to_string());
		}
		Ok(self)
	}
}

pub fn parse_client_config(content: &str) -> Result<ClientConfig, String> {
	let config: ClientConfig = toml::from_str(content)
		.map_err(|e| format!("Failed to parse client config: {}", e))?;
	config.validate()
}

pub fn load_client_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig, String> {
	let content = fs::read_to_string(&path)
		.map_err(|e| format!("Failed to read {}: {}", path.as_ref().display(), e))?;

	parse_client_config(&content)
		.map_err(|e| format!("{} ({})", e, path.as_ref().display()))
}

pub fn load_client_config_auto() -> Result<ClientConfig, String> {
	let path = resolve_config(CLIENT_FILE)?;
	load_client_config(&path)
}
