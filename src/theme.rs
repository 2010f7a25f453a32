//! 主题偏好
//!
//! 启动时依次尝试：已保存的 `"theme"` 值 → 系统深浅色偏好 → 浅色。
//! 每次修改都会持久化，并同步到"文档级"深色标记（终端渲染据此选择配色）。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::settings::KeyValueStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(AppError::InvalidInput(format!(
                "未知主题：{}（可选：light / dark）",
                other
            ))),
        }
    }
}

/// 宿主环境的深浅色偏好信号。
pub trait SystemThemeProbe: Send + Sync {
    /// `Some(true)` 表示偏好深色；信号不可用时返回 `None`。
    fn prefers_dark(&self) -> Option<bool>;
}

/// 从环境变量推断终端/桌面的深浅色偏好。
///
/// - `GTK_THEME` 形如 `Adwaita:dark`
/// - `COLORFGBG` 形如 `15;0`（最后一段为背景色号，0–6 与 8 视为深色）
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvThemeProbe;

impl SystemThemeProbe for EnvThemeProbe {
    fn prefers_dark(&self) -> Option<bool> {
        if let Ok(gtk) = std::env::var("GTK_THEME") {
            return Some(gtk.to_ascii_lowercase().ends_with(":dark"));
        }

        let colorfgbg = std::env::var("COLORFGBG").ok()?;
        parse_colorfgbg(&colorfgbg)
    }
}

fn parse_colorfgbg(value: &str) -> Option<bool> {
    let background = value.rsplit(';').next()?.trim().parse::<u8>().ok()?;
    Some(matches!(background, 0..=6 | 8))
}

/// 主题控制器：持有当前主题与文档级深色标记。
pub struct ThemeController {
    store: Arc<dyn KeyValueStore>,
    theme: Theme,
    document_dark: bool,
}

impl ThemeController {
    /// 读取已保存的主题；没有时才询问系统偏好。
    pub fn load(store: Arc<dyn KeyValueStore>, probe: &dyn SystemThemeProbe) -> Self {
        let stored = match store.get(THEME_KEY) {
            Ok(Some(value)) => match value.parse::<Theme>() {
                Ok(theme) => Some(theme),
                Err(err) => {
                    log::warn!("⚠️ 忽略无效的主题设置: {}", err);
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("⚠️ 读取主题设置失败: {}", err);
                None
            }
        };

        let theme = stored.unwrap_or_else(|| match probe.prefers_dark() {
            Some(true) => Theme::Dark,
            Some(false) | None => Theme::Light,
        });
        log::debug!("🎨 初始主题: {}", theme);

        Self {
            store,
            document_dark: theme == Theme::Dark,
            theme,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// 文档级深色标记。
    pub fn document_dark(&self) -> bool {
        self.document_dark
    }

    /// 设置主题：先持久化，再同步文档标记。
    pub fn set(&mut self, theme: Theme) -> Result<(), AppError> {
        self.store.set(THEME_KEY, theme.as_str())?;
        self.theme = theme;
        self.document_dark = theme == Theme::Dark;
        log::info!("🎨 主题已切换为 {}", theme);
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<Theme, AppError> {
        let next = self.theme.toggled();
        self.set(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProbe {
        answer: Option<bool>,
        calls: AtomicUsize,
    }

    impl CountingProbe {
        fn new(answer: Option<bool>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SystemThemeProbe for CountingProbe {
        fn prefers_dark(&self) -> Option<bool> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    #[test]
    fn falls_back_to_system_preference() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let controller = ThemeController::load(store, &CountingProbe::new(Some(true)));
        assert_eq!(controller.theme(), Theme::Dark);
        assert!(controller.document_dark());
    }

    #[test]
    fn defaults_to_light_without_any_signal() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let controller = ThemeController::load(store, &CountingProbe::new(None));
        assert_eq!(controller.theme(), Theme::Light);
        assert!(!controller.document_dark());
    }

    #[test]
    fn stored_value_survives_restart_without_probe() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut first = ThemeController::load(store.clone(), &CountingProbe::new(Some(false)));
        first.set(Theme::Dark).expect("set");
        drop(first);

        let probe = CountingProbe::new(Some(false));
        let restarted = ThemeController::load(store, &probe);
        assert_eq!(restarted.theme(), Theme::Dark);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_stored_value_is_ignored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(THEME_KEY, "blue").expect("seed");
        let controller = ThemeController::load(store, &CountingProbe::new(Some(true)));
        assert_eq!(controller.theme(), Theme::Dark);
    }

    #[test]
    fn toggle_persists_and_updates_marker() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut controller = ThemeController::load(store.clone(), &CountingProbe::new(None));

        assert_eq!(controller.toggle().expect("toggle"), Theme::Dark);
        assert!(controller.document_dark());
        assert_eq!(store.get(THEME_KEY).expect("get").as_deref(), Some("dark"));

        assert_eq!(controller.toggle().expect("toggle"), Theme::Light);
        assert!(!controller.document_dark());
        assert_eq!(store.get(THEME_KEY).expect("get").as_deref(), Some("light"));
    }

    #[test]
    fn colorfgbg_background_decides() {
        assert_eq!(parse_colorfgbg("15;0"), Some(true));
        assert_eq!(parse_colorfgbg("0;15"), Some(false));
        assert_eq!(parse_colorfgbg("0;default;15"), Some(false));
        assert_eq!(parse_colorfgbg("garbage"), None);
    }
}
