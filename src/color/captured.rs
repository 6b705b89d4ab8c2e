use chrono::{DateTime, Utc};
use rand::Rng;

use super::{ColorFormat, ColorValue};

/// 一次取色的历史记录
///
/// 创建后不可变；身份只由 `id` 决定，颜色相同但 id 不同的两条记录互不相等。
#[derive(Debug, Clone)]
pub struct CapturedColor {
    id: String,
    color: ColorValue,
    picked_at: DateTime<Utc>,
}

impl CapturedColor {
    /// 以新 id 与当前时间创建记录
    pub fn capture(color: ColorValue) -> Self {
        Self {
            id: generate_id(),
            color,
            picked_at: Utc::now(),
        }
    }

    /// 还原已持久化的记录
    pub fn from_parts(id: String, color: ColorValue, picked_at: DateTime<Utc>) -> Self {
        Self { id, color, picked_at }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn color(&self) -> &ColorValue {
        &self.color
    }

    pub fn picked_at(&self) -> DateTime<Utc> {
        self.picked_at
    }

    pub fn formatted(&self, format: ColorFormat) -> String {
        self.color.format(format)
    }
}

impl PartialEq for CapturedColor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CapturedColor {}

/// 随机 v4 UUID 形式的大写 id
fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill(&mut bytes[..]);
    bytes[6] = (bytes[6] & 0x0F) | 0x40;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::{generate_id, CapturedColor};
    use crate::color::ColorValue;

    #[test]
    fn generated_ids_look_like_uuid_v4() {
        let id = generate_id();
        assert_eq!(id.len(), 36);
        assert_eq!(id.as_bytes()[14], b'4');
        assert_eq!(id.matches('-').count(), 4);
    }

    #[test]
    fn identity_is_id_only() {
        let color = ColorValue::from_rgb8(10, 20, 30);
        let a = CapturedColor::capture(color);
        let b = CapturedColor::capture(color);
        assert_ne!(a, b);

        let same_id = CapturedColor::from_parts(
            a.id().to_string(),
            ColorValue::from_rgb8(0, 0, 0),
            a.picked_at(),
        );
        assert_eq!(a, same_id);
    }
}
