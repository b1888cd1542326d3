use std::fs;
use std::path::PathBuf;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "stickit";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the notes, background image and offset are stored.
    pub data_dir: String,
    /// Separate store used by the legacy single-note popup.
    pub sync_dir: String,
    /// Command that opens the panel in its own window. Empty disables it.
    pub window_command: String,
    /// Cells moved per arrow key while positioning the background.
    pub drag_step: i32,
    pub log_level: String,
    pub transparent_bg: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from(std::env::var("HOME").unwrap_or_default()).join(".local/share"))
            .join(APP_DIR);
        Self {
            sync_dir: data_dir.join("sync").to_string_lossy().to_string(),
            data_dir: data_dir.to_string_lossy().to_string(),
            window_command: String::new(),
            drag_step: 1,
            log_level: "info".to_string(),
            transparent_bg: false,
        }
    }
}

impl Config {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(std::env::var("HOME").unwrap_or_default()).join(".config"))
            .join(APP_DIR)
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn exists() -> bool {
        Self::config_path().exists()
    }

    /// Reads the config file, falling back to defaults when it is missing or
    /// malformed.
    pub fn load() -> Self {
        match fs::read_to_string(Self::config_path()) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_default()
    }

    pub fn load_or_create() -> Self {
        if !Self::exists() {
            let config = Self::default();
            if let Err(e) = config.save() {
                log::warn!("could not write default config: {}", e);
            }
            return config;
        }
        Self::load()
    }

    pub fn save(&self) -> std::io::Result<()> {
        fs::create_dir_all(Self::config_dir())?;
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(Self::config_path(), content)
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).to_string())
    }

    pub fn sync_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.sync_dir).to_string())
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_path().join("stickit.log")
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

/// Colors for everything that is not a note card.
#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub foreground: Color,
    pub note_text: Color,
    pub muted: Color,
    pub border: Color,
    pub warning: Color,
    pub error: Color,
    pub success: Color,
    pub info: Color,
    pub pin: Color,
    pub background: Color,
    pub statusbar: StatusBarTheme,
}

#[derive(Debug, Clone)]
pub struct StatusBarTheme {
    pub background: Color,
    pub foreground: Color,
    pub brand: Color,
    pub mode: Color,
    pub separator: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Rgb(0x19, 0x76, 0xd2),
            foreground: Color::Rgb(0xe0, 0xe0, 0xe0),
            note_text: Color::Rgb(0x22, 0x22, 0x22),
            muted: Color::Rgb(0x88, 0x88, 0x88),
            border: Color::Rgb(0xbb, 0xbb, 0xbb),
            warning: Color::Rgb(0xff, 0xb7, 0x4d),
            error: Color::Rgb(0xe5, 0x39, 0x35),
            success: Color::Rgb(0x43, 0xa0, 0x47),
            info: Color::Rgb(0x4f, 0xc3, 0xf7),
            pin: Color::Rgb(0xff, 0xd6, 0x00),
            background: Color::Rgb(0x1e, 0x22, 0x2a),
            statusbar: StatusBarTheme {
                background: Color::Rgb(0x26, 0x2b, 0x35),
                foreground: Color::Rgb(0xc8, 0xc8, 0xc8),
                brand: Color::Rgb(0xff, 0xd6, 0x00),
                mode: Color::Rgb(0x9e, 0x9e, 0x9e),
                separator: Color::Rgb(0x5c, 0x63, 0x70),
            },
        }
    }
}
