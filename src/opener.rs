//! 用系统默认程序打开链接。

use crate::error::AppError;

pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<(), AppError>;
}

/// 调用平台命令（`xdg-open` / `open` / `start`）打开链接。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

#[cfg(target_os = "windows")]
impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), AppError> {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", url])
            .spawn()
            .map_err(|e| AppError::Open(format!("{}", e)))?;
        log::info!("🌐 已在浏览器中打开链接");
        Ok(())
    }
}

#[cfg(target_os = "macos")]
impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), AppError> {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .map_err(|e| AppError::Open(format!("{}", e)))?;
        log::info!("🌐 已在浏览器中打开链接");
        Ok(())
    }
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), AppError> {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .map_err(|e| AppError::Open(format!("{}", e)))?;
        log::info!("🌐 已在浏览器中打开链接");
        Ok(())
    }
}
