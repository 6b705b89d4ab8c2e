//! 颜色文本编解码
//!
//! # 设计思路
//!
//! - `encode`：全函数，任何合法 `ColorValue` 都能输出四种格式之一。
//!   文本格式不携带 alpha，解码结果恒为不透明。
//! - `decode`：按 HEX → RGB → HSL → HSB 的固定顺序尝试，第一个结构匹配即决定结果；
//!   字段越界直接判定为“不是颜色”，不做截断，也不回退到后续语法。
//!
//! # 实现思路
//!
//! - 四种语法各自一条整串匹配的正则，`(?i)` 忽略大小写，
//!   通过 `once_cell::sync::Lazy` 首次使用时编译。
//! - 输入超过 30 个字符直接拒绝：剪贴板每秒轮询一次，避免对大段文本跑正则。

use once_cell::sync::Lazy;
use regex::Regex;

use super::convert::{hsb_to_rgb, hsl_to_rgb, rgb_to_hsb, rgb_to_hsl};
use super::{ColorFormat, ColorValue};

/// 可解析文本的最大长度（按字符计，去除首尾空白后）
pub const MAX_INPUT_CHARS: usize = 30;

static HEX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{6})$").expect("HEX 正则无效"));

static RGB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$")
        .expect("RGB 正则无效")
});

static HSL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^hsl\(\s*(\d{1,3})\s*,\s*(\d{1,3})%\s*,\s*(\d{1,3})%\s*\)$")
        .expect("HSL 正则无效")
});

static HSB_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^hsb\(\s*(\d{1,3})\s*,\s*(\d{1,3})%\s*,\s*(\d{1,3})%\s*\)$")
        .expect("HSB 正则无效")
});

const HUE_MAX: u16 = 360;
const PERCENT_MAX: u16 = 100;
const CHANNEL_MAX: u16 = 255;

// ============================================================================
// 编码
// ============================================================================

/// 将颜色值格式化为指定文本格式
pub fn encode(color: &ColorValue, format: ColorFormat) -> String {
    let (r, g, b) = (color.red(), color.green(), color.blue());

    match format {
        ColorFormat::Hex => {
            let (r8, g8, b8) = color.to_rgb8();
            format!("#{:02X}{:02X}{:02X}", r8, g8, b8)
        }
        ColorFormat::Rgb => {
            let (r8, g8, b8) = color.to_rgb8();
            format!("rgb({}, {}, {})", r8, g8, b8)
        }
        ColorFormat::Hsl => {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            format!(
                "hsl({}, {}%, {}%)",
                round_hue(h),
                round_percent(s),
                round_percent(l)
            )
        }
        ColorFormat::Hsb => {
            let (h, s, v) = rgb_to_hsb(r, g, b);
            format!(
                "hsb({}, {}%, {}%)",
                round_hue(h),
                round_percent(s),
                round_percent(v)
            )
        }
    }
}

/// 色相取整到 `[0, 360)`：359.5° 以上回绕为 0°
fn round_hue(hue: f64) -> u16 {
    (hue.round() as u16) % HUE_MAX
}

fn round_percent(fraction: f64) -> u16 {
    (fraction * 100.0).round() as u16
}

// ============================================================================
// 解码
// ============================================================================

/// 解析颜色文本，任何不匹配或越界都返回 `None`
pub fn decode(text: &str) -> Option<ColorValue> {
    decode_with_format(text).map(|(color, _)| color)
}

/// 解析颜色文本，同时返回命中的格式
pub fn decode_with_format(text: &str) -> Option<(ColorValue, ColorFormat)> {
    let trimmed = text.trim();
    if trimmed.chars().count() > MAX_INPUT_CHARS {
        return None;
    }

    for format in ColorFormat::ALL {
        let pattern = match format {
            ColorFormat::Hex => &HEX_PATTERN,
            ColorFormat::Rgb => &RGB_PATTERN,
            ColorFormat::Hsl => &HSL_PATTERN,
            ColorFormat::Hsb => &HSB_PATTERN,
        };
        if let Some(caps) = pattern.captures(trimmed) {
            // 结构已匹配：结果由该语法决定，越界即失败
            return decode_fields(format, &caps).map(|color| (color, format));
        }
    }

    None
}

fn decode_fields(format: ColorFormat, caps: &regex::Captures<'_>) -> Option<ColorValue> {
    match format {
        ColorFormat::Hex => {
            let value = u32::from_str_radix(caps.get(1)?.as_str(), 16).ok()?;
            Some(ColorValue::from_rgb8(
                ((value >> 16) & 0xFF) as u8,
                ((value >> 8) & 0xFF) as u8,
                (value & 0xFF) as u8,
            ))
        }
        ColorFormat::Rgb => {
            let r = bounded_field(caps, 1, CHANNEL_MAX)?;
            let g = bounded_field(caps, 2, CHANNEL_MAX)?;
            let b = bounded_field(caps, 3, CHANNEL_MAX)?;
            Some(ColorValue::from_rgb8(r as u8, g as u8, b as u8))
        }
        ColorFormat::Hsl => {
            let (h, s, l) = hue_and_percents(caps)?;
            let (r, g, b) = hsl_to_rgb(h, s, l);
            Some(ColorValue::from_conversion(r, g, b))
        }
        ColorFormat::Hsb => {
            let (h, s, v) = hue_and_percents(caps)?;
            let (r, g, b) = hsb_to_rgb(h, s, v);
            Some(ColorValue::from_conversion(r, g, b))
        }
    }
}

fn hue_and_percents(caps: &regex::Captures<'_>) -> Option<(f64, f64, f64)> {
    let h = bounded_field(caps, 1, HUE_MAX)?;
    let p1 = bounded_field(caps, 2, PERCENT_MAX)?;
    let p2 = bounded_field(caps, 3, PERCENT_MAX)?;
    Some((
        f64::from(h),
        f64::from(p1) / 100.0,
        f64::from(p2) / 100.0,
    ))
}

fn bounded_field(caps: &regex::Captures<'_>, index: usize, max: u16) -> Option<u16> {
    caps.get(index)?
        .as_str()
        .parse::<u16>()
        .ok()
        .filter(|&v| v <= max)
}
