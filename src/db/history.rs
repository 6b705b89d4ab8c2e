//! 取色历史子模块
//!
//! ## 职责
//! - 以固定 key 持久化整条历史（最新在前，最多 100 条）
//! - `load` / `save` / `remove` / `clear` 各自完成一次“读取 → 修改 → 写回”
//!
//! ## 并发语义
//! - 所有写操作经同一把写锁串行化：两个并发 `save` 若交错读取，
//!   后写回的一方会覆盖另一方的插入
//! - 不在调用之间缓存历史，持久化内容是唯一数据源
//!
//! ## 错误语义
//! - 读取失败或数据损坏一律视为“没有历史”，`load` 返回空列表
//! - 写回失败返回 `AppError`，由调用方决定是否记录日志

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::color::{CapturedColor, ColorValue};
use crate::error::AppError;

use super::BlobStore;

/// 历史记录在 blob 存储中的 key
pub const HISTORY_KEY: &str = "colorHistory";

/// 历史记录上限
pub const MAX_HISTORY: usize = 100;

/// 持久化格式中的单条记录
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorRecord {
    id: String,
    red: f64,
    green: f64,
    blue: f64,
    alpha: f64,
    picked_at: DateTime<Utc>,
}

impl From<&CapturedColor> for ColorRecord {
    fn from(captured: &CapturedColor) -> Self {
        let color = captured.color();
        Self {
            id: captured.id().to_string(),
            red: color.red(),
            green: color.green(),
            blue: color.blue(),
            alpha: color.alpha(),
            picked_at: captured.picked_at(),
        }
    }
}

impl ColorRecord {
    fn into_captured(self) -> Option<CapturedColor> {
        match ColorValue::new(self.red, self.green, self.blue, self.alpha) {
            Ok(color) => Some(CapturedColor::from_parts(self.id, color, self.picked_at)),
            Err(err) => {
                log::warn!("跳过无效的历史记录 {}: {}", self.id, err);
                None
            }
        }
    }
}

fn decode_history(bytes: &[u8]) -> Result<Vec<CapturedColor>, serde_json::Error> {
    let records: Vec<ColorRecord> = serde_json::from_slice(bytes)?;
    let mut colors: Vec<CapturedColor> = records
        .into_iter()
        .filter_map(ColorRecord::into_captured)
        .collect();
    colors.truncate(MAX_HISTORY);
    Ok(colors)
}

fn encode_history(colors: &[CapturedColor]) -> Result<Vec<u8>, AppError> {
    let records: Vec<ColorRecord> = colors.iter().map(ColorRecord::from).collect();
    Ok(serde_json::to_vec(&records)?)
}

/// 容量受限、单写者的取色历史
///
/// 克隆得到的句柄共享同一后端与写锁，可以安全地移动到后台线程。
pub struct HistoryStore<B: BlobStore> {
    blob: Arc<B>,
    write_lock: Arc<Mutex<()>>,
}

impl<B: BlobStore> Clone for HistoryStore<B> {
    fn clone(&self) -> Self {
        Self {
            blob: Arc::clone(&self.blob),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<B: BlobStore> HistoryStore<B> {
    pub fn new(blob: B) -> Self {
        Self::from_shared(Arc::new(blob))
    }

    pub fn from_shared(blob: Arc<B>) -> Self {
        Self {
            blob,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 读取历史（最新在前）；缺失或损坏时返回空列表
    pub fn load(&self) -> Vec<CapturedColor> {
        let bytes = match self.blob.get(HISTORY_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(err) => {
                log::warn!("读取取色历史失败，按空历史处理: {}", err);
                return Vec::new();
            }
        };

        match decode_history(&bytes) {
            Ok(colors) => colors,
            Err(err) => {
                log::warn!("取色历史已损坏，按空历史处理: {}", err);
                Vec::new()
            }
        }
    }

    /// 插入到最前，超出上限时丢弃最旧的记录
    pub fn save(&self, color: CapturedColor) -> Result<(), AppError> {
        let _writer = self.lock_writer();
        let mut colors = self.load();
        colors.insert(0, color);
        if colors.len() > MAX_HISTORY {
            log::debug!("取色历史超过 {} 条，丢弃最旧的 {} 条", MAX_HISTORY, colors.len() - MAX_HISTORY);
            colors.truncate(MAX_HISTORY);
        }
        self.persist(&colors)
    }

    /// 删除所有匹配 id 的记录；id 不存在时历史保持不变
    pub fn remove(&self, id: &str) -> Result<(), AppError> {
        let _writer = self.lock_writer();
        let mut colors = self.load();
        colors.retain(|color| color.id() != id);
        self.persist(&colors)
    }

    pub fn clear(&self) -> Result<(), AppError> {
        let _writer = self.lock_writer();
        self.persist(&[])
    }

    fn persist(&self, colors: &[CapturedColor]) -> Result<(), AppError> {
        let bytes = encode_history(colors)?;
        self.blob.set(HISTORY_KEY, &bytes)
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("取色历史写锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::{TimeZone, Utc};

    use super::{HistoryStore, HISTORY_KEY, MAX_HISTORY};
    use crate::color::{CapturedColor, ColorValue};
    use crate::db::{BlobStore, MemoryBlobStore};

    fn captured(n: u8) -> CapturedColor {
        CapturedColor::capture(ColorValue::from_rgb8(n, n, n))
    }

    fn ids(colors: &[CapturedColor]) -> Vec<String> {
        colors.iter().map(|c| c.id().to_string()).collect()
    }

    #[test]
    fn load_empty_store_returns_empty() {
        let store = HistoryStore::new(MemoryBlobStore::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_inserts_most_recent_first() {
        let store = HistoryStore::new(MemoryBlobStore::new());
        let c1 = captured(1);
        let c2 = captured(2);

        store.save(c1.clone()).expect("save c1");
        store.save(c2.clone()).expect("save c2");

        assert_eq!(store.load(), vec![c2, c1]);
    }

    #[test]
    fn save_trims_to_capacity_dropping_oldest() {
        let store = HistoryStore::new(MemoryBlobStore::new());
        let all: Vec<CapturedColor> = (0..=MAX_HISTORY).map(|n| captured(n as u8)).collect();
        for color in &all {
            store.save(color.clone()).expect("save");
        }

        let loaded = store.load();
        assert_eq!(loaded.len(), MAX_HISTORY);
        assert_eq!(loaded[0], all[MAX_HISTORY]);
        assert!(!loaded.contains(&all[0]), "oldest record should be dropped");

        let expected: Vec<String> = all[1..].iter().rev().map(|c| c.id().to_string()).collect();
        assert_eq!(ids(&loaded), expected);
    }

    #[test]
    fn remove_unknown_id_keeps_history() {
        let store = HistoryStore::new(MemoryBlobStore::new());
        let c1 = captured(1);
        store.save(c1.clone()).expect("save");

        store.remove("no-such-id").expect("remove");
        assert_eq!(store.load(), vec![c1]);
    }

    #[test]
    fn remove_deletes_every_duplicate_id() {
        let store = HistoryStore::new(MemoryBlobStore::new());
        let c1 = captured(1);
        let c2 = captured(2);
        let dup = CapturedColor::from_parts(
            c1.id().to_string(),
            ColorValue::from_rgb8(9, 9, 9),
            Utc::now(),
        );
        store.save(c1.clone()).expect("save c1");
        store.save(c2.clone()).expect("save c2");
        store.save(dup).expect("save dup");

        store.remove(c1.id()).expect("remove");
        assert_eq!(store.load(), vec![c2]);
    }

    #[test]
    fn clear_empties_history() {
        let store = HistoryStore::new(MemoryBlobStore::new());
        store.save(captured(1)).expect("save");
        store.clear().expect("clear");
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_blob_loads_as_empty_and_is_replaced_on_save() {
        let blob = Arc::new(MemoryBlobStore::new());
        blob.set(HISTORY_KEY, b"not-json").expect("seed corrupt blob");
        let store = HistoryStore::from_shared(Arc::clone(&blob));

        assert!(store.load().is_empty());

        let c1 = captured(1);
        store.save(c1.clone()).expect("save");
        assert_eq!(store.load(), vec![c1]);
    }

    #[test]
    fn out_of_range_records_are_skipped() {
        let blob = Arc::new(MemoryBlobStore::new());
        let json = r#"[
            {"id":"ok","red":0.1,"green":0.2,"blue":0.3,"alpha":1.0,"pickedAt":"2026-01-02T03:04:05Z"},
            {"id":"bad","red":1.5,"green":0.2,"blue":0.3,"alpha":1.0,"pickedAt":"2026-01-02T03:04:05Z"}
        ]"#;
        blob.set(HISTORY_KEY, json.as_bytes()).expect("seed blob");
        let store = HistoryStore::from_shared(blob);

        let loaded = store.load();
        assert_eq!(ids(&loaded), vec!["ok".to_string()]);
        assert_eq!(
            loaded[0].picked_at(),
            Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
        );
    }

    #[test]
    fn persisted_fields_use_camel_case_names() {
        let blob = Arc::new(MemoryBlobStore::new());
        let store = HistoryStore::from_shared(Arc::clone(&blob));
        store.save(captured(7)).expect("save");

        let raw = blob.get(HISTORY_KEY).expect("get").expect("blob present");
        let value: serde_json::Value = serde_json::from_slice(&raw).expect("valid json");
        let entry = &value[0];
        for field in ["id", "red", "green", "blue", "alpha", "pickedAt"] {
            assert!(entry.get(field).is_some(), "missing field: {field}");
        }
    }

    #[test]
    fn reloaded_components_are_bit_identical() {
        let store = HistoryStore::new(MemoryBlobStore::new());
        let mut saved: Vec<CapturedColor> = (0..=255u8).step_by(3).map(captured).collect();
        saved.push(CapturedColor::capture(
            ColorValue::new(42.0 / 255.0, 0.1 + 0.2, 1.0 - f64::EPSILON, 0.7).expect("in range"),
        ));
        for color in &saved {
            store.save(color.clone()).expect("save");
        }

        let loaded = store.load();
        assert_eq!(loaded.len(), saved.len());
        for (reloaded, original) in loaded.iter().zip(saved.iter().rev()) {
            let (a, b) = (reloaded.color(), original.color());
            assert_eq!(a.red().to_bits(), b.red().to_bits(), "red of {}", original.id());
            assert_eq!(a.green().to_bits(), b.green().to_bits(), "green of {}", original.id());
            assert_eq!(a.blue().to_bits(), b.blue().to_bits(), "blue of {}", original.id());
            assert_eq!(a.alpha().to_bits(), b.alpha().to_bits(), "alpha of {}", original.id());
            assert_eq!(reloaded.picked_at(), original.picked_at());
        }
    }

    #[test]
    fn concurrent_saves_are_not_lost() {
        let store = HistoryStore::new(MemoryBlobStore::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..5 {
                        store.save(captured(n * 10 + i)).expect("save");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }

        assert_eq!(store.load().len(), 40);
    }
}
