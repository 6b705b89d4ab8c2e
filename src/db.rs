//! 持久化模块
//!
//! # 设计思路
//!
//! 取色历史只需要“按 key 存取一整块字节”的能力，因此持久化边界是
//! `BlobStore` trait，而不是面向表结构的 CRUD：
//!
//! - **blob**：`BlobStore` trait 及 SQLite / 内存两种实现
//! - **history**：`HistoryStore`，容量受限、单写者的历史记录
//! - **schema / config**：SQLite 表结构与数据库文件路径
//!
//! # 实现思路
//!
//! - SQLite 连接由 `Mutex<Connection>` 包装，跨线程共享。
//! - 历史记录以 JSON 数组整体写入一个 key，最新在前。

mod blob;
mod config;
mod history;
mod schema;

pub use blob::{BlobStore, MemoryBlobStore, SqliteBlobStore};
pub use history::{HistoryStore, HISTORY_KEY, MAX_HISTORY};
