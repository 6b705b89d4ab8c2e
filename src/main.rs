//! # 取色工具 — 命令行入口
//!
//! 本文件仅负责日志、设置与各组件的装配。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_snap::capture::{CaptureCoordinator, PickOutcome};
use color_snap::clipboard::{self, ClipboardWatcher, SystemClipboard};
use color_snap::color::{self, CapturedColor, ColorFormat, ColorValue};
use color_snap::db::{HistoryStore, SqliteBlobStore};
use color_snap::error::AppError;
use color_snap::sampler::LineSampler;
use color_snap::settings::{self, AppSettings};
use tokio::io::{BufReader, Stdin};

#[derive(Parser)]
#[command(
    name = "color-snap",
    about = "Capture colors, convert between HEX/RGB/HSL/HSB and keep a color history",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the clipboard and print every color copied to it
    Watch,

    /// Pick a color (typed on stdin), copy it and add it to the history
    Pick {
        /// Clipboard format, defaults to the configured format
        #[arg(short, long)]
        format: Option<ColorFormat>,
    },

    /// Convert color text to other formats
    Convert {
        /// Color text, e.g. "#1A2B3C" or "hsl(120, 100%, 50%)"
        text: String,

        /// Only print this format
        #[arg(short, long)]
        to: Option<ColorFormat>,
    },

    /// List the color history, most recent first
    History,

    /// Copy a history entry to the clipboard
    Copy {
        /// History entry id
        id: String,

        /// Clipboard format, defaults to the configured format
        #[arg(short, long)]
        format: Option<ColorFormat>,
    },

    /// Remove a history entry
    Remove {
        /// History entry id
        id: String,
    },

    /// Remove every history entry
    Clear,

    /// Set the default clipboard format
    SetFormat {
        format: ColorFormat,
    },
}

/// 单次写入后持有剪贴板的最长时间（X11/Wayland 无剪贴板管理器时生效）
const CLIPBOARD_HOLD: Duration = Duration::from_secs(30);

type Coordinator = CaptureCoordinator<LineSampler<BufReader<Stdin>>, SystemClipboard, SqliteBlobStore>;

fn build_coordinator(settings: &AppSettings) -> Result<Coordinator, AppError> {
    let blob = SqliteBlobStore::open_default(settings.db_dir.as_deref())?;
    let sampler = LineSampler::new(BufReader::new(tokio::io::stdin()));
    Ok(CaptureCoordinator::new(
        sampler,
        Arc::new(SystemClipboard::start().hold_writes(CLIPBOARD_HOLD)),
        HistoryStore::new(blob),
    ))
}

fn print_all_formats(color: &ColorValue) {
    for format in ColorFormat::ALL {
        println!("{:>4}  {}", format, color::encode(color, format));
    }
}

fn print_entry(entry: &CapturedColor, format: ColorFormat) {
    println!(
        "{}  {}  {}",
        entry.id(),
        entry.picked_at().with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"),
        entry.formatted(format)
    );
}

async fn watch(settings: &AppSettings) {
    let clipboard = Arc::new(SystemClipboard::start());
    let mut watcher = ClipboardWatcher::new(clipboard);
    let mut updates = watcher.subscribe();
    let watcher = Arc::new(Mutex::new(watcher));
    let poller = clipboard::spawn_polling(watcher, settings.poll_interval());

    log::info!("📋 正在监视剪贴板（Ctrl+C 退出）");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = updates.recv() => match update {
                Some(Some(color)) => {
                    println!();
                    print_all_formats(&color);
                }
                Some(None) => log::debug!("剪贴板中没有颜色"),
                None => break,
            },
        }
    }
    poller.abort();
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut settings = settings::load_settings();

    match cli.command {
        Commands::Watch => watch(&settings).await,
        Commands::Convert { text, to } => match color::decode_with_format(&text) {
            Some((value, detected)) => {
                eprintln!("input format: {}", detected);
                match to {
                    Some(format) => println!("{}", color::encode(&value, format)),
                    None => print_all_formats(&value),
                }
            }
            None => println!("not a color: {}", text.trim()),
        },
        Commands::Pick { format } => {
            let coordinator = build_coordinator(&settings)?;
            let format = format.unwrap_or(settings.default_format);
            eprintln!("Enter a color (HEX/RGB/HSL/HSB), empty line to cancel:");
            match coordinator.pick(format).await {
                PickOutcome::Captured(entry) => print_entry(&entry, format),
                PickOutcome::Cancelled => println!("cancelled"),
                PickOutcome::Busy => println!("a pick is already in progress"),
            }
        }
        Commands::History => {
            let coordinator = build_coordinator(&settings)?;
            for entry in coordinator.load_history().await {
                print_entry(&entry, settings.default_format);
            }
        }
        Commands::Copy { id, format } => {
            let coordinator = build_coordinator(&settings)?;
            let format = format.unwrap_or(settings.default_format);
            let history = coordinator.load_history().await;
            match history.iter().find(|entry| entry.id() == id) {
                Some(entry) => println!("{}", coordinator.copy(entry, format).await?),
                None => println!("no history entry with id {}", id),
            }
        }
        Commands::Remove { id } => {
            let coordinator = build_coordinator(&settings)?;
            let remaining = coordinator.remove(&id).await;
            println!("{} entries left", remaining.len());
        }
        Commands::Clear => {
            let coordinator = build_coordinator(&settings)?;
            coordinator.clear().await;
            println!("history cleared");
        }
        Commands::SetFormat { format } => {
            settings.default_format = format;
            settings::save_settings(&settings)?;
            println!("default format: {}", format);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Cli::parse()).await {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
