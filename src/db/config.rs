use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::settings;

pub(crate) const DB_FILE_NAME: &str = "color-snap.db";

fn resolve_db_path_from_config(data_dir: &Path, db_dir: Option<&str>) -> Result<PathBuf, AppError> {
    if let Some(dir) = db_dir {
        if !dir.is_empty() {
            let dir_path = PathBuf::from(dir);
            fs::create_dir_all(&dir_path).map_err(|e| {
                AppError::Database(format!("创建数据库目录失败: {}", e))
            })?;
            return Ok(dir_path.join(DB_FILE_NAME));
        }
    }
    Ok(data_dir.join(DB_FILE_NAME))
}

/// 数据库文件路径：优先使用设置中的 `dbDir`，否则放在应用数据目录
pub(crate) fn resolve_db_path(db_dir: Option<&str>) -> Result<PathBuf, AppError> {
    resolve_db_path_from_config(&settings::data_dir(), db_dir)
}

#[cfg(test)]
mod tests {
    use super::{resolve_db_path_from_config, DB_FILE_NAME};

    #[test]
    fn resolve_db_path_prefers_configured_dir_or_data_dir() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let data_dir = dir.path().join("data");

        let configured = dir.path().join("configured");
        let configured_str = configured.to_string_lossy().to_string();
        let configured_path = resolve_db_path_from_config(&data_dir, Some(configured_str.as_str()))
            .expect("resolve configured path");

        assert_eq!(configured_path, configured.join(DB_FILE_NAME));
        assert!(configured.exists());

        let default_path =
            resolve_db_path_from_config(&data_dir, None).expect("resolve default path");
        assert_eq!(default_path, data_dir.join(DB_FILE_NAME));

        let empty_path =
            resolve_db_path_from_config(&data_dir, Some("")).expect("resolve empty override");
        assert_eq!(empty_path, data_dir.join(DB_FILE_NAME));
    }
}
