//! # 应用外壳
//!
//! 把扫描服务、主题控制器、链接打开器和文件选择控件组合在一起，
//! 以 [`Action`] 的形式接收用户操作，并从当前快照构建视图。

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::acquisition::{FileInput, PasteEvent};
use crate::error::AppError;
use crate::opener::LinkOpener;
use crate::presentation::View;
use crate::presentation::render::{Palette, Renderer};
use crate::scan::{AcquisitionHandle, ScanService};
use crate::theme::{Theme, ThemeController};

/// 用户操作。
#[derive(Debug, Clone)]
pub enum Action {
    Paste(PasteEvent),
    SelectFile(PathBuf),
    Copy,
    OpenLink,
    Reset,
    ToggleTheme,
    SetTheme(Theme),
}

pub struct App {
    scanner: ScanService,
    theme: Mutex<ThemeController>,
    opener: Arc<dyn LinkOpener>,
    file_input: Mutex<FileInput>,
}

fn recover<'a, T>(result: std::sync::LockResult<MutexGuard<'a, T>>, what: &str) -> MutexGuard<'a, T> {
    match result {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("{}锁中毒，继续使用恢复数据", what);
            poisoned.into_inner()
        }
    }
}

impl App {
    pub fn new(scanner: ScanService, theme: ThemeController, opener: Arc<dyn LinkOpener>) -> Self {
        Self {
            scanner,
            theme: Mutex::new(theme),
            opener,
            file_input: Mutex::new(FileInput::new()),
        }
    }

    pub fn scanner(&self) -> &ScanService {
        &self.scanner
    }

    pub fn theme(&self) -> Theme {
        recover(self.theme.lock(), "主题").theme()
    }

    /// 执行一次用户操作；产生新扫描请求时返回其后台任务句柄。
    ///
    /// 需要在 tokio 运行时内调用。
    pub fn dispatch(&self, action: Action) -> Result<Option<AcquisitionHandle>, AppError> {
        match action {
            Action::Paste(event) => self.scanner.handle_paste(&event),
            Action::SelectFile(path) => {
                let mut input = recover(self.file_input.lock(), "文件选择");
                input.select(path);
                self.scanner.handle_file_selected(&mut input)
            }
            Action::Copy => {
                self.scanner.copy_result()?;
                Ok(None)
            }
            Action::OpenLink => {
                self.scanner.open_link(self.opener.as_ref())?;
                Ok(None)
            }
            Action::Reset => {
                self.scanner.reset();
                Ok(None)
            }
            Action::ToggleTheme => {
                recover(self.theme.lock(), "主题").toggle()?;
                Ok(None)
            }
            Action::SetTheme(theme) => {
                recover(self.theme.lock(), "主题").set(theme)?;
                Ok(None)
            }
        }
    }

    pub fn view(&self) -> View {
        View::from_snapshot(&self.scanner.snapshot())
    }

    /// 以当前主题渲染视图；`colored` 为 false 时输出纯文本。
    pub fn render(&self, colored: bool) -> String {
        let palette = if colored {
            Palette::for_theme(self.theme())
        } else {
            Palette::plain()
        };
        Renderer::new(palette, self.scanner.config().max_visible_lines).render(&self.view())
    }

    /// 文件选择控件当前的值（读取后应为空）。
    pub fn selected_file(&self) -> Option<PathBuf> {
        recover(self.file_input.lock(), "文件选择").value().cloned()
    }
}
