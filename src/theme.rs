use std::fs;
use std::path::PathBuf;

use ratatui::style::Color;
use ratatui::widgets::BorderType;
use serde::{Deserialize, Serialize};

use crate::config::APP_DIR;
use crate::outcome::Tone;
use crate::render::MarkerMark;

pub const DEFAULT_THEME: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
	pub background_color: String,
	pub grid_color: String,
	pub text_color: String,
	pub dim_text_color: String,

	pub human_slash_color: String,
	pub cpu_slash_color: String,
	pub loop_cell_color: String,
	pub pending_cell_color: String,
	pub changed_cell_color: String,

	pub marker_neutral_color: String,
	pub marker_satisfied_color: String,
	pub marker_error_color: String,

	pub human_turn_color: String,
	pub cpu_turn_color: String,
	pub prompt_color: String,
	pub loop_color: String,
	pub victory_color: String,
	pub defeat_color: String,
	pub draw_color: String,
	pub invalid_color: String,
	pub notice_color: String,
	pub alert_color: String,

	pub overlay_border_style: String,
	pub overlay_border_color: String,
	pub opponent_on_color: String,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background_color: "#0f172a".to_string(),
			grid_color: "dark_gray".to_string(),
			text_color: "white".to_string(),
			dim_text_color: "gray".to_string(),

			human_slash_color: "#38bdf8".to_string(),
			cpu_slash_color: "#f43f5e".to_string(),
			loop_cell_color: "#ef4444".to_string(),
			pending_cell_color: "yellow".to_string(),
			changed_cell_color: "white".to_string(),

			marker_neutral_color: "white".to_string(),
			marker_satisfied_color: "#22c55e".to_string(),
			marker_error_color: "#ef4444".to_string(),

			human_turn_color: "#22c55e".to_string(),
			cpu_turn_color: "#fbbf24".to_string(),
			prompt_color: "#38bdf8".to_string(),
			loop_color: "#ef4444".to_string(),
			victory_color: "#4ade80".to_string(),
			defeat_color: "#f43f5e".to_string(),
			draw_color: "#fbbf24".to_string(),
			invalid_color: "#fbbf24".to_string(),
			notice_color: "cyan".to_string(),
			alert_color: "#ef4444".to_string(),

			overlay_border_style: "double".to_string(),
			overlay_border_color: "#4ade80".to_string(),
			opponent_on_color: "#4ade80".to_string(),
		}
	}
}

impl Theme {
	/// Loads the named theme, then `theme.toml`, falling back to the
	/// built-in colours.
	pub fn load(name: Option<&str>) -> Self {
		if let Some(name) = name {
			if let Ok(theme) = Self::load_named(name) {
				return theme;
			}
		}
		if let Some(path) = Self::config_path() {
			if let Ok(contents) = fs::read_to_string(&path) {
				if let Ok(theme) = toml::from_str(&contents) {
					return theme;
				}
			}
		}
		Self::default()
	}

	pub fn load_named(name: &str) -> Result<Self, String> {
		let filename = format!("{}.toml", name);
		let path = Self::theme_dirs()
			.into_iter()
			.map(|dir| dir.join(&filename))
			.find(|p| p.exists());

		match path {
			Some(path) => {
				let contents = fs::read_to_string(&path)
					.map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
				toml::from_str(&contents)
					.map_err(|e| format!("Failed to parse theme {}: {}", path.display(), e))
			}
			None if name == DEFAULT_THEME => Ok(Self::default()),
			None => Err(format!("Theme '{}' not found", name)),
		}
	}

	pub fn list_available() -> Vec<String> {
		crate::defaults::list_themes()
	}

	fn theme_dirs() -> Vec<PathBuf> {
		let mut dirs = Vec::new();
		if let Some(config_dir) = dirs::config_dir() {
			dirs.push(config_dir.join(APP_DIR).join("themes"));
		}
		dirs.push(PathBuf::from("config/themes"));
		dirs
	}

	fn config_path() -> Option<PathBuf> {
		if let Some(config_dir) = dirs::config_dir() {
			let user_path = config_dir.join(APP_DIR).join("theme.toml");
			if user_path.exists() {
				return Some(user_path);
			}
		}
		let repo_path = PathBuf::from("config/theme.toml");
		if repo_path.exists() {
			return Some(repo_path);
		}
		None
	}

	pub fn tone(&self, tone: Tone) -> Color {
		parse_color(match tone {
			Tone::HumanTurn => &self.human_turn_color,
			Tone::CpuTurn => &self.cpu_turn_color,
			Tone::Prompt => &self.prompt_color,
			Tone::Loop => &self.loop_color,
			Tone::Victory => &self.victory_color,
			Tone::Defeat => &self.defeat_color,
			Tone::Draw => &self.draw_color,
			Tone::Invalid => &self.invalid_color,
			Tone::Notice => &self.notice_color,
			Tone::Alert => &self.alert_color,
			Tone::Neutral => &self.text_color,
		})
	}

	pub fn marker(&self, mark: MarkerMark) -> Color {
		parse_color(match mark {
			MarkerMark::Neutral => &self.marker_neutral_color,
			MarkerMark::Satisfied => &self.marker_satisfied_color,
			MarkerMark::Error => &self.marker_error_color,
		})
	}

	pub fn background(&self) -> Color {
		parse_color(&self.background_color)
	}

	pub fn grid(&self) -> Color {
		parse_color(&self.grid_color)
	}

	pub fn text(&self) -> Color {
		parse_color(&self.text_color)
	}

	pub fn dim_text(&self) -> Color {
		parse_color(&self.dim_text_color)
	}

	pub fn human_slash(&self) -> Color {
		parse_color(&self.human_slash_color)
	}

	pub fn cpu_slash(&self) -> Color {
		parse_color(&self.cpu_slash_color)
	}

	pub fn loop_cell(&self) -> Color {
		parse_color(&self.loop_cell_color)
	}

	pub fn pending_cell(&self) -> Color {
		parse_color(&self.pending_cell_color)
	}

	pub fn changed_cell(&self) -> Color {
		parse_color(&self.changed_cell_color)
	}

	pub fn overlay_border_type(&self) -> BorderType {
		parse_border_type(&self.overlay_border_style)
	}

	pub fn overlay_border(&self) -> Color {
		parse_color(&self.overlay_border_color)
	}

	pub fn opponent_on(&self) -> Color {
		parse_color(&self.opponent_on_color)
	}
}

fn parse_color(s: &str) -> Color {
	match s.to_lowercase().as_str() {
		"black" => Color::Black,
		"red" => Color::Red,
		"green" => Color::Green,
		"yellow" => Color::Yellow,
		"blue" => Color::Blue,
		"magenta" => Color::Magenta,
		"cyan" => Color::Cyan,
		"gray" | "grey" => Color::Gray,
		"dark_gray" | "dark_grey" | "darkgray" | "darkgrey" => Color::DarkGray,
		"light_red" | "lightred" => Color::LightRed,
		"light_green" | "lightgreen" => Color::LightGreen,
		"light_yellow" | "lightyellow" => Color::LightYellow,
		"light_blue" | "lightblue" => Color::LightBlue,
		"light_magenta" | "lightmagenta" => Color::LightMagenta,
		"light_cyan" | "lightcyan" => Color::LightCyan,
		"white" => Color::White,
		"reset" | "none" => Color::Reset,
		_ => {
			if let Some(hex) = s.strip_prefix('#') {
				if hex.len() == 6 {
					if let Ok(rgb) = u32::from_str_radix(hex, 16) {
						let r = ((rgb >> 16) & 0xFF) as u8;
						let g = ((rgb >> 8) & 0xFF) as u8;
						let b = (rgb & 0xFF) as u8;
						return Color::Rgb(r, g, b);
					}
				}
			}
			if let Some(inner) = s.strip_prefix("rgb(").and_then(|rest| rest.strip_suffix(')')) {
				let parts: Vec<&str> = inner.split(',').collect();
				if parts.len() == 3 {
					if let (Ok(r), Ok(g), Ok(b)) = (
						parts[0].trim().parse::<u8>(),
						parts[1].trim().parse::<u8>(),
						parts[2].trim().parse::<u8>(),
					) {
						return Color::Rgb(r, g, b);
					}
				}
			}
			Color::White
		}
	}
}

fn parse_border_type(s: &str) -> BorderType {
	match s.to_lowercase().as_str() {
		"double" => BorderType::Double,
		"thick" => BorderType::Thick,
		"rounded" => BorderType::Rounded,
		_ => BorderType::Plain,
	}
}
