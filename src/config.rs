use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default = "default_search_console_worksheet")]
    pub search_console_worksheet: String,
    #[serde(default = "default_analytics_worksheet")]
    pub analytics_worksheet: String,
    #[serde(default = "default_output_worksheet")]
    pub output_worksheet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_anchor_utc")]
    pub anchor_utc: String,
    #[serde(default = "default_cadence_days")]
    pub cadence_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub telegram_bot_token: String,
    #[serde(default)]
    pub telegram_chat_id: String,
    #[serde(default = "default_enable_stdout")]
    pub enable_stdout: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<String>,
    pub output_worksheet: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/seo-variations/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.storage.data_dir = data_dir;
        }
        if let Some(output_worksheet) = overrides.output_worksheet {
            self.sheets.output_worksheet = output_worksheet;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.data_dir)
    }

    /// Telegram credentials with environment fallback, `None` unless both
    /// halves are present.
    pub fn telegram_credentials(&self) -> Option<(String, String)> {
        let token = non_empty(&self.notify.telegram_bot_token)
            .or_else(|| std::env::var("TELEGRAM_BOT_TOKEN").ok().and_then(|v| non_empty(&v)));
        let chat_id = non_empty(&self.notify.telegram_chat_id)
            .or_else(|| std::env::var("TELEGRAM_CHAT_ID").ok().and_then(|v| non_empty(&v)));
        match (token, chat_id) {
            (Some(token), Some(chat_id)) => Some((token, chat_id)),
            _ => None,
        }
    }

    pub fn default_template() -> String {
        let template = r#"[sheets]
search_console_worksheet = "gsc_data_daily"
analytics_worksheet = "ga4_data_daily"
output_worksheet = "analysis_raw"

[storage]
data_dir = "~/.local/share/seo-variations/sheets"

[schedule]
anchor_utc = "2025-12-28T08:15:00+00:00"
cadence_days = 28

[notify]
telegram_bot_token = ""
telegram_chat_id = ""
enable_stdout = true
"#;
        template.to_string()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            search_console_worksheet: default_search_console_worksheet(),
            analytics_worksheet: default_analytics_worksheet(),
            output_worksheet: default_output_worksheet(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            anchor_utc: default_anchor_utc(),
            cadence_days: default_cadence_days(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            enable_stdout: default_enable_stdout(),
        }
    }
}

fn default_search_console_worksheet() -> String {
    "gsc_data_daily".to_string()
}

fn default_analytics_worksheet() -> String {
    "ga4_data_daily".to_string()
}

fn default_output_worksheet() -> String {
    "analysis_raw".to_string()
}

fn default_data_dir() -> String {
    "~/.local/share/seo-variations/sheets".to_string()
}

fn default_anchor_utc() -> String {
    "2025-12-28T08:15:00+00:00".to_string()
}

fn default_cadence_days() -> i64 {
    28
}

fn default_enable_stdout() -> bool {
    true
}
