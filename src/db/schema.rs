//! Schema 初始化子模块
//!
//! ## 职责
//! - 创建键值表 `kv`（一个 key 对应一个不透明 blob）
//! - 设置 SQLite 运行参数（WAL）
//! - 通过 `PRAGMA user_version` 记录 schema 版本
//!
//! ## 错误语义
//! - DDL 失败统一映射为 `AppError::Database`

use rusqlite::Connection;

use crate::error::AppError;

pub(super) const SCHEMA_VERSION: i64 = 1;

fn get_user_version(conn: &Connection) -> Result<i64, AppError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| AppError::Database(format!("读取数据库版本失败: {}", e)))
}

fn set_user_version(conn: &Connection, version: i64) -> Result<(), AppError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| AppError::Database(format!("写入数据库版本失败: {}", e)))
}

fn enable_wal(conn: &Connection) {
    // 内存数据库会返回 "memory"，不影响使用
    match conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get::<_, String>(0)) {
        Ok(mode) => log::debug!("SQLite journal_mode = {}", mode),
        Err(err) => log::warn!("设置 WAL 模式失败，继续使用默认日志模式: {}", err),
    }
}

fn create_kv_table(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value BLOB NOT NULL,
            updated_at INTEGER NOT NULL
        );",
    )
    .map_err(|e| AppError::Database(format!("创建键值表失败: {}", e)))
}

pub(super) fn initialize_schema(conn: &Connection) -> Result<(), AppError> {
    enable_wal(conn);

    let mut version = get_user_version(conn)?;
    if version < 1 {
        create_kv_table(conn)?;
        set_user_version(conn, 1)?;
        version = 1;
    }

    if version != SCHEMA_VERSION {
        return Err(AppError::Database(format!(
            "数据库版本不匹配: current={}, expected={}",
            version, SCHEMA_VERSION
        )));
    }

    Ok(())
}
