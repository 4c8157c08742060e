//! 设置服务
//!
//! 在命名空间存储之上管理主题模式和任意 JSON 设置项。显式构造后注入使用方，
//! 深浅色变化通过 watch 通道通知。

use std::fmt;
use std::str::FromStr;

use adconsole_shared::storage::PrefixedStorage;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::Result;

const THEME_STORAGE_KEY: &str = "theme-mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    /// light → dark → system → light
    pub fn next(&self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::System,
            ThemeMode::System => ThemeMode::Light,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ThemeMode::Light => "sun",
            ThemeMode::Dark => "moon",
            ThemeMode::System => "computer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThemeMode::Light => "浅色模式",
            ThemeMode::Dark => "深色模式",
            ThemeMode::System => "跟随系统",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            other => Err(format!("未知的主题模式: {}", other)),
        }
    }
}

/// 主题配色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
    pub error: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
}

pub const LIGHT_PALETTE: Palette = Palette {
    background: "#ffffff",
    surface: "#f9fafb",
    primary: "#3b82f6",
    secondary: "#6b7280",
    text: "#111827",
    text_secondary: "#6b7280",
    border: "#e5e7eb",
    error: "#ef4444",
    success: "#22c55e",
    warning: "#f59e0b",
};

pub const DARK_PALETTE: Palette = Palette {
    background: "#1f2937",
    surface: "#374151",
    primary: "#3b82f6",
    secondary: "#6b7280",
    text: "#f9fafb",
    text_secondary: "#9ca3af",
    border: "#4b5563",
    error: "#ef4444",
    success: "#22c55e",
    warning: "#f59e0b",
};

#[derive(Debug, Clone, Copy)]
struct ThemeState {
    mode: ThemeMode,
    system_dark: bool,
}

impl ThemeState {
    fn is_dark(&self) -> bool {
        match self.mode {
            ThemeMode::System => self.system_dark,
            mode => mode == ThemeMode::Dark,
        }
    }
}

#[derive(Debug)]
pub struct SettingsService {
    storage: PrefixedStorage,
    theme: RwLock<ThemeState>,
    dark_tx: watch::Sender<bool>,
}

impl SettingsService {
    /// 从存储恢复主题模式；无效或缺失的值按跟随系统处理
    pub fn new(storage: PrefixedStorage) -> Self {
        let mode = storage.get::<ThemeMode>(THEME_STORAGE_KEY).unwrap_or_default();
        let state = ThemeState {
            mode,
            system_dark: false,
        };
        let (dark_tx, _) = watch::channel(state.is_dark());

        Self {
            storage,
            theme: RwLock::new(state),
            dark_tx,
        }
    }

    // ==================== 主题 ====================

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme.read().mode
    }

    pub fn set_theme_mode(&self, mode: ThemeMode) {
        self.update_theme(|state| state.mode = mode);
        if let Err(e) = self.storage.set(THEME_STORAGE_KEY, &mode) {
            warn!(error = %e, "主题模式写入存储失败");
        }
        debug!(mode = %mode, "主题模式已切换");
    }

    /// 宿主检测到系统配色变化时调用
    pub fn set_system_dark(&self, dark: bool) {
        self.update_theme(|state| state.system_dark = dark);
    }

    /// 按 light → dark → system 循环切换，返回新模式
    pub fn toggle(&self) -> ThemeMode {
        let next = self.theme_mode().next();
        self.set_theme_mode(next);
        next
    }

    pub fn is_dark(&self) -> bool {
        self.theme.read().is_dark()
    }

    /// 实际生效的主题名
    pub fn theme_name(&self) -> &'static str {
        if self.is_dark() { "dark" } else { "light" }
    }

    pub fn theme_icon(&self) -> &'static str {
        self.theme_mode().icon()
    }

    pub fn theme_label(&self) -> &'static str {
        self.theme_mode().label()
    }

    pub fn palette(&self) -> Palette {
        if self.is_dark() {
            DARK_PALETTE
        } else {
            LIGHT_PALETTE
        }
    }

    /// 订阅实际深浅色的变化
    pub fn watch_dark(&self) -> watch::Receiver<bool> {
        self.dark_tx.subscribe()
    }

    fn update_theme(&self, apply: impl FnOnce(&mut ThemeState)) {
        let dark = {
            let mut state = self.theme.write();
            apply(&mut state);
            state.is_dark()
        };
        self.dark_tx.send_if_modified(|current| {
            if *current == dark {
                false
            } else {
                *current = dark;
                true
            }
        });
    }

    // ==================== 通用设置 ====================

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.storage.get(key)
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.storage.get_or(key, default)
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        Ok(self.storage.set(key, value)?)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        Ok(self.storage.remove(key)?)
    }

    /// 只清除本命名空间下的键
    pub fn clear(&self) -> Result<()> {
        self.storage.clear()?;
        self.update_theme(|state| state.mode = ThemeMode::default());
        Ok(())
    }
}
