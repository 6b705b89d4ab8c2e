//! 剪贴板模块
//!
//! # 设计思路
//!
//! - **ClipboardAccess**：剪贴板协作者边界，读文本、写文本、取变化令牌。
//! - **变化令牌**：剪贴板内容每次变化都会得到一个不同的令牌，
//!   轮询只比较令牌，令牌不变时不读取内容。
//! - **listener**：系统剪贴板实现，`arboard` 负责读写，
//!   `clipboard-master` 监听线程负责推进令牌。
//! - **watcher**：轮询状态机，把剪贴板文本解码为颜色并通知订阅者。
//!
//! # 实现思路
//!
//! - 令牌是单调递增的代数计数器，`AtomicU64` 跨线程无锁读写。
//! - 监控器运行在独立线程中，退出后按指数退避自动重启。
//! - 应用自身写入剪贴板同样推进令牌：取色后观察者会看到刚复制的颜色。

pub mod listener;
pub mod watcher;

use crate::error::AppError;

pub use listener::SystemClipboard;
pub use watcher::{spawn_polling, ClipboardWatcher, PollOutcome};

/// 剪贴板变化令牌
///
/// 不透明、可比较；剪贴板内容每次变化后取得的令牌都与之前不同。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeToken(u64);

impl ChangeToken {
    pub fn new(generation: u64) -> Self {
        Self(generation)
    }
}

/// 剪贴板协作者
pub trait ClipboardAccess: Send + Sync {
    /// 当前剪贴板文本；没有文本内容时返回 `None`
    fn read_text(&self) -> Option<String>;

    fn write_text(&self, text: &str) -> Result<(), AppError>;

    fn change_token(&self) -> ChangeToken;
}
