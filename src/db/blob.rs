//! 键值 blob 存储子模块
//!
//! ## 职责
//! - 定义历史记录依赖的持久化边界 `BlobStore`（按 key 读写整块字节）
//! - 提供 SQLite 实现（应用运行时）与内存实现（测试 / 临时会话）
//!
//! ## 错误语义
//! - SQLite 失败统一映射为 `AppError::Database`
//! - 锁中毒时继续使用恢复数据，不向上传播

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppError;

use super::{config, schema};

/// 按 key 读写不透明字节块的持久化后端
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    fn set(&self, key: &str, value: &[u8]) -> Result<(), AppError>;
}

fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("存储锁中毒，继续使用恢复数据");
            poisoned.into_inner()
        }
    }
}

// ============================================================================
// SQLite 实现
// ============================================================================

/// 基于 SQLite 单表的 blob 存储
pub struct SqliteBlobStore {
    conn: Mutex<Connection>,
}

impl SqliteBlobStore {
    /// 打开（必要时创建）指定路径的数据库并初始化 schema
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::Database(format!("创建数据库目录失败: {}", e))
                })?;
            }
        }
        log::info!("数据库路径: {}", path.display());

        let conn = Connection::open(path).map_err(|e| {
            AppError::Database(format!("打开数据库失败: {}", e))
        })?;
        Self::from_connection(conn)
    }

    /// 按设置解析数据库路径后打开
    pub fn open_default(db_dir: Option<&str>) -> Result<Self, AppError> {
        let path = config::resolve_db_path(db_dir)?;
        Self::open(&path)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            AppError::Database(format!("创建内存数据库失败: {}", e))
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        schema::initialize_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> Result<T, AppError>) -> Result<T, AppError> {
        let conn = lock_recovering(&self.conn);
        op(&conn)
    }
}

impl BlobStore for SqliteBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()
            .map_err(|e| AppError::Database(format!("读取键 {} 失败: {}", key, e)))
        })
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), AppError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .map_err(|e| AppError::Database(format!("写入键 {} 失败: {}", key, e)))?;
            Ok(())
        })
    }
}

// ============================================================================
// 内存实现
// ============================================================================

/// 进程内 blob 存储，不落盘
#[derive(Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
        Ok(lock_recovering(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), AppError> {
        lock_recovering(&self.entries).insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
