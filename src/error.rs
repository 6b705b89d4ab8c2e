//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，所有可失败的外部协作者调用
//! （剪贴板、数据库、配置文件）统一返回 `Result<T, AppError>`。
//!
//! 颜色解析失败、历史数据损坏、用户取消取色都不是错误：
//! 它们分别以 `None` / 空列表 / `PickOutcome::Cancelled` 表达，不会出现在这里。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error` 与 `serde_json::Error` 提供 `From` 转换，无需手动 map。

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板读写操作失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 存储目录或配置文件不可用
    #[error("存储目录不可用: {0}")]
    Storage(String),

    /// 数据库操作失败
    #[error("数据库错误: {0}")]
    Database(String),

    /// 序列化 / 反序列化失败
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}
