//! 剪贴板颜色轮询
//!
//! `ClipboardWatcher::poll` 自身不持有线程、不阻塞：令牌不变时立即返回；
//! 令牌变化时读取文本并尝试解码为颜色，把结果（包括“没有颜色”）
//! 恰好一次地推送给每个订阅者。周期调度由 `spawn_polling` 或外部调度器负责。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{ChangeToken, ClipboardAccess};
use crate::color::{self, ColorValue};

/// 单次轮询的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// 令牌未变化，没有任何副作用
    Unchanged,
    /// 令牌变化，已发布新的颜色状态
    Updated(Option<ColorValue>),
}

pub struct ClipboardWatcher<C: ClipboardAccess> {
    clipboard: Arc<C>,
    last_token: Option<ChangeToken>,
    latest: Option<ColorValue>,
    subscribers: Vec<UnboundedSender<Option<ColorValue>>>,
}

impl<C: ClipboardAccess> ClipboardWatcher<C> {
    /// 首次 `poll` 总会读取一次剪贴板
    pub fn new(clipboard: Arc<C>) -> Self {
        Self {
            clipboard,
            last_token: None,
            latest: None,
            subscribers: Vec::new(),
        }
    }

    /// 订阅颜色状态变化；接收端被丢弃后自动退订
    pub fn subscribe(&mut self) -> UnboundedReceiver<Option<ColorValue>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// 最近一次解码出的剪贴板颜色
    pub fn latest(&self) -> Option<ColorValue> {
        self.latest
    }

    pub fn poll(&mut self) -> PollOutcome {
        let token = self.clipboard.change_token();
        if self.last_token == Some(token) {
            return PollOutcome::Unchanged;
        }
        self.last_token = Some(token);

        let decoded = self
            .clipboard
            .read_text()
            .and_then(|text| color::decode(&text));
        log::debug!("📋 剪贴板令牌变化 {:?}，解码结果: {:?}", token, decoded);

        self.latest = decoded;
        self.publish(decoded);
        PollOutcome::Updated(decoded)
    }

    fn publish(&mut self, value: Option<ColorValue>) {
        self.subscribers.retain(|tx| tx.send(value).is_ok());
    }
}

/// 在 tokio 运行时上按固定周期轮询
///
/// 首个 tick 立即触发；错过的 tick 直接跳过，不会补发。
/// 每次 `poll` 在阻塞线程池执行，调度任务本身不会被剪贴板读取卡住。
/// 返回的 `JoinHandle` 可用于 `abort()` 停止轮询。
pub fn spawn_polling<C>(watcher: Arc<Mutex<ClipboardWatcher<C>>>, period: Duration) -> JoinHandle<()>
where
    C: ClipboardAccess + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            // 读取系统剪贴板可能阻塞，放到阻塞线程池
            let watcher = Arc::clone(&watcher);
            let polled = tokio::task::spawn_blocking(move || {
                let mut guard = match watcher.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => {
                        log::warn!("剪贴板轮询状态锁中毒，继续使用恢复数据");
                        poisoned.into_inner()
                    }
                };
                guard.poll()
            })
            .await;
            if let Err(err) = polled {
                log::error!("剪贴板轮询任务异常退出: {}", err);
            }
        }
    })
}
