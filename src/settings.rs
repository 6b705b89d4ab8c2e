//! 应用设置
//!
//! 设置文件为 JSON（camelCase），位于 `$XDG_CONFIG_HOME/color-snap/settings.json`，
//! 其次 `$HOME/.config/color-snap/settings.json`。文件缺失或无法解析时使用默认值。

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::ColorFormat;
use crate::error::AppError;

const APP_DIR_NAME: &str = "color-snap";
const SETTINGS_FILE_NAME: &str = "settings.json";

const POLL_INTERVAL_DEFAULT_MS: u64 = 1_000;
const POLL_INTERVAL_MIN_MS: u64 = 100;
const POLL_INTERVAL_MAX_MS: u64 = 10_000;

fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL_DEFAULT_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// 取色后写入剪贴板使用的格式
    #[serde(default)]
    pub default_format: ColorFormat,

    /// 剪贴板轮询周期
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// 历史数据库目录，未设置时使用应用数据目录
    #[serde(default)]
    pub db_dir: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_format: ColorFormat::default(),
            poll_interval_ms: POLL_INTERVAL_DEFAULT_MS,
            db_dir: None,
        }
    }
}

impl AppSettings {
    /// 轮询周期（已限制在合理范围内）
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(normalize_poll_interval_ms(self.poll_interval_ms))
    }
}

fn normalize_poll_interval_ms(value_ms: u64) -> u64 {
    value_ms.clamp(POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS)
}

fn app_dir_under(env_var: &str, home_fallback: &[&str]) -> PathBuf {
    if let Ok(dir) = std::env::var(env_var) {
        if !dir.is_empty() {
            return PathBuf::from(dir).join(APP_DIR_NAME);
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        let mut path = PathBuf::from(home);
        for segment in home_fallback {
            path.push(segment);
        }
        return path.join(APP_DIR_NAME);
    }
    PathBuf::from(".")
}

/// 配置目录
pub fn config_dir() -> PathBuf {
    app_dir_under("XDG_CONFIG_HOME", &[".config"])
}

/// 数据目录（历史数据库默认位置）
pub fn data_dir() -> PathBuf {
    app_dir_under("XDG_DATA_HOME", &[".local", "share"])
}

pub fn settings_file_path() -> PathBuf {
    config_dir().join(SETTINGS_FILE_NAME)
}

pub fn load_settings_from_path(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("解析设置文件失败，使用默认设置: {}", err);
                AppSettings::default()
            }
        },
        Err(err) => {
            log::warn!("读取设置文件失败，使用默认设置: {}", err);
            AppSettings::default()
        }
    }
}

pub fn save_settings_to_path(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Storage(format!("创建配置目录失败: {}", e)))?;
    }

    let content = serde_json::to_string_pretty(settings)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_settings() -> AppSettings {
    load_settings_from_path(&settings_file_path())
}

pub fn save_settings(settings: &AppSettings) -> Result<(), AppError> {
    save_settings_to_path(&settings_file_path(), settings)
}
