//! # 本地二维码扫描工具 — 命令行入口
//!
//! 本文件仅负责参数解析、依赖装配与输出。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;

use qr_paste::app::{Action, App};
use qr_paste::clipboard::{self, SystemClipboard};
use qr_paste::config::ScannerConfig;
use qr_paste::decoder::RqrrDecoder;
use qr_paste::error::AppError;
use qr_paste::opener::SystemOpener;
use qr_paste::scan::{ScanService, ScanState};
use qr_paste::settings::JsonFileStore;
use qr_paste::theme::{EnvThemeProbe, Theme, ThemeController};

/// Decode QR codes from an image file or the clipboard. Nothing leaves this machine.
#[derive(Parser, Debug)]
#[command(name = "qr-paste")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image file to scan
    #[arg(value_name = "IMAGE")]
    image: Option<PathBuf>,

    /// Scan the image currently on the clipboard
    #[arg(long, conflicts_with = "image")]
    paste: bool,

    /// Keep running and scan every image copied to the clipboard
    #[arg(long, conflicts_with_all = ["image", "paste"])]
    watch: bool,

    /// Copy a successful result back to the clipboard
    #[arg(long)]
    copy: bool,

    /// Open a successful result in the default browser when it is an http(s) link
    #[arg(long)]
    open: bool,

    /// Switch and remember the colour theme (light or dark)
    #[arg(long, value_name = "THEME")]
    theme: Option<Theme>,

    /// Print views as JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Settings file (defaults to the user data directory)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Largest image file accepted, in MB
    #[arg(long, value_name = "MB")]
    max_file_size_mb: Option<u64>,
}

struct Output {
    json: bool,
    colored: bool,
}

impl Output {
    fn emit(&self, app: &App) {
        if self.json {
            match serde_json::to_string(&app.view()) {
                Ok(line) => println!("{}", line),
                Err(err) => log::error!("❌ 视图序列化失败: {}", err),
            }
        } else {
            print!("{}", app.render(self.colored));
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("❌ 创建异步运行时失败: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(code) => code,
        Err(err) => {
            log::error!("❌ {}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn build_app(args: &Args) -> Result<App, AppError> {
    let mut config = ScannerConfig::default();
    if let Some(megabytes) = args.max_file_size_mb {
        config = config.with_max_file_size_mb(megabytes)?;
    }
    if let Some(path) = &args.settings {
        config = config.with_settings_path(path);
    }

    let settings_path = config.resolve_settings_path()?;
    log::debug!("⚙️ 设置文件: {}", settings_path.display());
    let theme = ThemeController::load(Arc::new(JsonFileStore::new(settings_path)), &EnvThemeProbe);

    let scanner = ScanService::new(config, Arc::new(RqrrDecoder), Arc::new(SystemClipboard::new()));
    Ok(App::new(scanner, theme, Arc::new(SystemOpener)))
}

async fn run(args: Args) -> Result<ExitCode, AppError> {
    let app = build_app(&args)?;
    if let Some(theme) = args.theme {
        app.dispatch(Action::SetTheme(theme))?;
    }

    let output = Output {
        json: args.json,
        colored: !args.json && std::io::stdout().is_terminal(),
    };

    if args.watch {
        watch(&app, &args, &output).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let action = match (&args.image, args.paste) {
        (Some(path), _) => Action::SelectFile(path.clone()),
        (None, true) => Action::Paste(clipboard::read_paste_event()?),
        (None, false) => {
            output.emit(&app);
            return Ok(ExitCode::SUCCESS);
        }
    };

    if !scan_once(&app, action, &args, &output).await? {
        output.emit(&app);
    }

    Ok(match app.scanner().snapshot().state {
        ScanState::Success => ExitCode::SUCCESS,
        ScanState::Error => ExitCode::from(2),
        ScanState::Idle | ScanState::Scanning => ExitCode::from(1),
    })
}

/// 执行一次扫描并输出中间与最终视图；没有图片时返回 `false`，不输出任何内容。
async fn scan_once(app: &App, action: Action, args: &Args, output: &Output) -> Result<bool, AppError> {
    let Some(handle) = app.dispatch(action)? else {
        log::info!("⏭️ 没有可扫描的图片");
        return Ok(false);
    };

    output.emit(app);
    handle.finished().await;

    if app.scanner().snapshot().state == ScanState::Success {
        if args.copy {
            app.dispatch(Action::Copy)?;
        }
        if args.open {
            app.dispatch(Action::OpenLink)?;
        }
    }

    output.emit(app);
    Ok(true)
}

/// 监听剪贴板，每次出现新图片就重新扫描。
async fn watch(app: &App, args: &Args, output: &Output) -> Result<(), AppError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _monitor = clipboard::start_monitoring(tx);
    output.emit(app);

    while let Some(change) = rx.recv().await {
        log::debug!("📋 剪贴板变化 - {:?} 前", change.at.elapsed());
        let event = match clipboard::read_paste_event() {
            Ok(event) => event,
            Err(err) => {
                log::warn!("⚠️ 读取剪贴板失败: {}", err);
                continue;
            }
        };

        if let Err(err) = scan_once(app, Action::Paste(event), args, output).await {
            log::warn!("⚠️ 本次扫描失败: {}", err);
        }
    }

    Ok(())
}
