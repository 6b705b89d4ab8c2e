//! 取色流程协调
//!
//! # 设计思路
//!
//! `CaptureCoordinator` 显式持有取色器、剪贴板与历史存储，
//! 串起一次用户发起的取色：取色 → 格式化 → 写入剪贴板 → 写入历史。
//!
//! - 取色期间对外暴露“忙碌”状态；第二个并发 `pick` 直接返回 `Busy`。
//! - 用户取消时释放忙碌状态，不写剪贴板，不写历史。
//! - 剪贴板写入与历史读写在阻塞线程池执行，不占用调用方所在的任务。
//! - 另外维护“当前选中颜色”，供展示层在历史变化后保持一致的选中项。
//!
//! # 实现思路
//!
//! - 忙碌状态使用 `tokio::sync::watch`：既是标志本身，也能被展示层订阅。
//! - `BusyGuard` 采用 RAII：获取时置位，`Drop` 时清除，任何退出路径都会恢复。

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::clipboard::ClipboardAccess;
use crate::color::{CapturedColor, ColorFormat};
use crate::db::{BlobStore, HistoryStore};
use crate::error::AppError;
use crate::sampler::ColorSampler;

/// 一次 `pick` 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// 取色成功，已写入剪贴板与历史
    Captured(CapturedColor),
    /// 用户取消
    Cancelled,
    /// 已有取色正在进行
    Busy,
}

impl PickOutcome {
    pub fn into_captured(self) -> Option<CapturedColor> {
        match self {
            PickOutcome::Captured(color) => Some(color),
            PickOutcome::Cancelled | PickOutcome::Busy => None,
        }
    }
}

/// 忙碌状态的 RAII 守卫
struct BusyGuard<'a> {
    busy: &'a watch::Sender<bool>,
}

impl<'a> BusyGuard<'a> {
    /// 未忙碌时置位并返回守卫，已忙碌返回 `None`
    fn acquire(busy: &'a watch::Sender<bool>) -> Option<Self> {
        let acquired = busy.send_if_modified(|picking| {
            if *picking {
                false
            } else {
                *picking = true;
                true
            }
        });
        // 惰性构造：未获取时不能产生守卫，否则 Drop 会清掉他人的忙碌状态
        acquired.then(|| Self { busy })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.send_replace(false);
    }
}

pub struct CaptureCoordinator<S, C, B>
where
    S: ColorSampler,
    C: ClipboardAccess,
    B: BlobStore + 'static,
{
    sampler: S,
    clipboard: Arc<C>,
    history: HistoryStore<B>,
    busy: watch::Sender<bool>,
    current: Mutex<Option<CapturedColor>>,
}

impl<S, C, B> CaptureCoordinator<S, C, B>
where
    S: ColorSampler,
    C: ClipboardAccess + 'static,
    B: BlobStore + 'static,
{
    pub fn new(sampler: S, clipboard: Arc<C>, history: HistoryStore<B>) -> Self {
        let (busy, _) = watch::channel(false);
        Self {
            sampler,
            clipboard,
            history,
            busy,
            current: Mutex::new(None),
        }
    }

    /// 是否正在取色
    pub fn is_picking(&self) -> bool {
        *self.busy.borrow()
    }

    /// 订阅忙碌状态变化
    pub fn subscribe_busy(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    /// 执行一次取色，写入剪贴板（使用 `format`）并保存到历史
    pub async fn pick(&self, format: ColorFormat) -> PickOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            log::debug!("已有取色正在进行，忽略本次请求");
            return PickOutcome::Busy;
        };

        let Some(color) = self.sampler.sample().await else {
            log::info!("取色已取消");
            return PickOutcome::Cancelled;
        };

        let captured = CapturedColor::capture(color);
        let text = captured.formatted(format);
        if let Err(err) = self.write_clipboard(text.clone()).await {
            log::warn!("取色结果写入剪贴板失败: {}", err);
        }

        let record = captured.clone();
        if let Some(Err(err)) = self.with_history(move |history| history.save(record)).await {
            log::warn!("保存取色历史失败: {}", err);
        }

        log::info!("🎨 已取色 {} ({})", text, captured.id());
        self.set_current(Some(captured.clone()));
        PickOutcome::Captured(captured)
    }

    /// 以指定格式把颜色复制到剪贴板，返回写入的文本
    pub async fn copy(&self, color: &CapturedColor, format: ColorFormat) -> Result<String, AppError> {
        let text = color.formatted(format);
        self.write_clipboard(text.clone()).await?;
        Ok(text)
    }

    /// 当前选中的颜色
    pub fn current(&self) -> Option<CapturedColor> {
        self.lock_current().clone()
    }

    pub fn select(&self, color: CapturedColor) {
        self.set_current(Some(color));
    }

    /// 读取历史快照；尚未选中任何颜色时选中最新一条
    pub async fn load_history(&self) -> Vec<CapturedColor> {
        let colors = self.history_snapshot().await;
        let mut current = self.lock_current();
        if current.is_none() {
            *current = colors.first().cloned();
        }
        colors
    }

    /// 删除一条历史，返回删除后的快照
    ///
    /// 被删除的是当前选中项时，改为选中剩余的最新一条。
    pub async fn remove(&self, id: &str) -> Vec<CapturedColor> {
        let target = id.to_string();
        if let Some(Err(err)) = self.with_history(move |history| history.remove(&target)).await {
            log::warn!("删除取色历史失败: {}", err);
        }

        let colors = self.history_snapshot().await;
        let mut current = self.lock_current();
        if current.as_ref().is_some_and(|c| c.id() == id) {
            *current = colors.first().cloned();
        }
        colors
    }

    /// 清空历史与当前选中项
    pub async fn clear(&self) {
        if let Some(Err(err)) = self.with_history(|history| history.clear()).await {
            log::warn!("清空取色历史失败: {}", err);
        }
        self.set_current(None);
    }

    async fn write_clipboard(&self, text: String) -> Result<(), AppError> {
        let clipboard = Arc::clone(&self.clipboard);
        tokio::task::spawn_blocking(move || clipboard.write_text(&text))
            .await
            .map_err(|e| AppError::Clipboard(format!("剪贴板写入任务异常退出: {}", e)))?
    }

    async fn history_snapshot(&self) -> Vec<CapturedColor> {
        self.with_history(|history| history.load())
            .await
            .unwrap_or_default()
    }

    /// 在阻塞线程池上执行历史操作；任务异常时返回 `None`
    async fn with_history<T, F>(&self, op: F) -> Option<T>
    where
        T: Send + 'static,
        F: FnOnce(HistoryStore<B>) -> T + Send + 'static,
    {
        let history = self.history.clone();
        match tokio::task::spawn_blocking(move || op(history)).await {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!("历史存储任务异常退出: {}", err);
                None
            }
        }
    }

    fn set_current(&self, color: Option<CapturedColor>) {
        *self.lock_current() = color;
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<CapturedColor>> {
        match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("当前颜色状态锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }
}
