use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clipboard_master::{CallbackResult, ClipboardHandler, Master};

use super::{ChangeToken, ClipboardAccess};
use crate::error::AppError;

const MONITOR_RESTART_BASE_DELAY_MS: u64 = 100;
const MONITOR_RESTART_MAX_DELAY_MS: u64 = 5_000;

fn compute_restart_backoff_ms(restart_attempt: u32) -> u64 {
    let exp = 1_u64 << restart_attempt.saturating_sub(1).min(6);
    MONITOR_RESTART_BASE_DELAY_MS
        .saturating_mul(exp)
        .min(MONITOR_RESTART_MAX_DELAY_MS)
}

/// 剪贴板事件处理器（内部实现）
///
/// 每次系统剪贴板变化时推进代数计数器。
struct Handler {
    generation: Arc<AtomicU64>,
}

impl ClipboardHandler for Handler {
    fn on_clipboard_change(&mut self) -> CallbackResult {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::trace!("📋 剪贴板变化，generation={}", generation);
        CallbackResult::Next
    }

    fn on_clipboard_error(&mut self, error: std::io::Error) -> CallbackResult {
        log::error!("剪贴板错误：{}", error);
        CallbackResult::Next
    }
}

/// 在后台线程启动剪贴板监听，退出后按退避策略重启
///
/// `listening` 仅在 `Master::run` 期间为 `true`。
fn start_monitoring(generation: Arc<AtomicU64>, listening: Arc<AtomicBool>) {
    thread::spawn(move || {
        let mut restart_attempt: u32 = 0;
        loop {
            match Master::new(Handler { generation: Arc::clone(&generation) }) {
                Ok(mut master) => {
                    restart_attempt = 0;
                    log::info!("📋 剪贴板监听已启动");
                    listening.store(true, Ordering::SeqCst);
                    let _ = master.run();
                    listening.store(false, Ordering::SeqCst);
                    log::warn!("📋 剪贴板监听已退出，将尝试重启");
                }
                Err(err) => {
                    log::error!("📋 创建剪贴板监听失败: {}", err);
                }
            }

            restart_attempt = restart_attempt.saturating_add(1);
            let backoff_ms = compute_restart_backoff_ms(restart_attempt);
            log::warn!("📋 剪贴板监听 {}ms 后重试（attempt={}）", backoff_ms, restart_attempt);
            thread::sleep(Duration::from_millis(backoff_ms));
        }
    });
}

/// 系统剪贴板
///
/// 文本读写委托 `arboard`（每次调用新建句柄，不跨线程持有），
/// 变化令牌由监听线程推进。
///
/// X11/Wayland 下剪贴板内容由写入进程持有。短命进程（命令行单次写入）
/// 需要通过 `hold_writes` 在写入后继续持有，直到剪贴板管理器或其他程序
/// 接管所有权，或者超过给定时长。
pub struct SystemClipboard {
    generation: Arc<AtomicU64>,
    listening: Arc<AtomicBool>,
    hold: Option<Duration>,
}

impl SystemClipboard {
    /// 创建系统剪贴板并启动后台监听线程
    pub fn start() -> Self {
        let clipboard = Self::detached();
        start_monitoring(Arc::clone(&clipboard.generation), Arc::clone(&clipboard.listening));
        clipboard
    }

    fn detached() -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            listening: Arc::new(AtomicBool::new(false)),
            hold: None,
        }
    }

    /// 写入后最多持有剪贴板 `hold`，期间 `write_text` 阻塞
    pub fn hold_writes(mut self, hold: Duration) -> Self {
        self.hold = Some(hold);
        self
    }

    /// 本次写入需要持有到的时间点
    fn hold_deadline(&self, now: Instant) -> Option<Instant> {
        self.hold.map(|hold| now + hold)
    }

    /// 记录自身写入：监听线程在运行时由它推进令牌，避免同一次变化推进两次
    fn note_own_write(&self) {
        if !self.listening.load(Ordering::SeqCst) {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[cfg(all(unix, not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))))]
    fn set_text(&self, clipboard: &mut arboard::Clipboard, text: &str) -> Result<(), arboard::Error> {
        use arboard::SetExtLinux;

        match self.hold_deadline(Instant::now()) {
            Some(deadline) => {
                log::info!("📋 持有剪贴板直到被其他程序接管（最多 {:?}）", self.hold.unwrap_or_default());
                clipboard.set().wait_until(deadline).text(text.to_string())
            }
            None => clipboard.set_text(text.to_string()),
        }
    }

    #[cfg(not(all(unix, not(any(target_os = "macos", target_os = "android", target_os = "emscripten")))))]
    fn set_text(&self, clipboard: &mut arboard::Clipboard, text: &str) -> Result<(), arboard::Error> {
        clipboard.set_text(text.to_string())
    }
}

impl ClipboardAccess for SystemClipboard {
    fn read_text(&self) -> Option<String> {
        let mut clipboard = match arboard::Clipboard::new() {
            Ok(clipboard) => clipboard,
            Err(err) => {
                log::debug!("打开剪贴板失败: {}", err);
                return None;
            }
        };
        clipboard.get_text().ok()
    }

    fn write_text(&self, text: &str) -> Result<(), AppError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| AppError::Clipboard(e.to_string()))?;
        self.set_text(&mut clipboard, text)
            .map_err(|e| AppError::Clipboard(e.to_string()))?;
        self.note_own_write();
        Ok(())
    }

    fn change_token(&self) -> ChangeToken {
        ChangeToken::new(self.generation.load(Ordering::SeqCst))
    }
}
