//! 颜色模型与编解码模块
//!
//! # 设计思路
//!
//! - **ColorValue**：归一化的 sRGB + alpha 采样值，四个分量均在 `[0, 1]`，
//!   构造时拒绝越界值而不是静默截断。
//! - **ColorFormat**：封闭的四种文本格式（HEX / RGB / HSL / HSB）。
//! - **CapturedColor**：带唯一 id 与取色时间的历史记录条目。
//! - **codec**：颜色值与四种文本格式之间的双向转换。
//!
//! # 实现思路
//!
//! - 色彩空间换算集中在 `convert`，纯函数、无分配。
//! - 文本解析使用 `once_cell::sync::Lazy` 预编译的正则，每次轮询零编译成本。

mod captured;
pub mod codec;
pub mod convert;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use captured::CapturedColor;
pub use codec::{decode, decode_with_format, encode};

/// 颜色分量越界错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorValueError {
    #[error("颜色分量 {component} 超出 [0, 1] 范围: {value}")]
    OutOfRange { component: &'static str, value: f64 },
}

/// 归一化的 RGBA 颜色值（固定 sRGB 工作空间）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorValue {
    red: f64,
    green: f64,
    blue: f64,
    alpha: f64,
}

fn check_unit(component: &'static str, value: f64) -> Result<f64, ColorValueError> {
    // NaN 不满足区间比较，同样会被拒绝
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ColorValueError::OutOfRange { component, value })
    }
}

impl ColorValue {
    /// 构造颜色值，任一分量越界即返回错误
    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Result<Self, ColorValueError> {
        Ok(Self {
            red: check_unit("red", red)?,
            green: check_unit("green", green)?,
            blue: check_unit("blue", blue)?,
            alpha: check_unit("alpha", alpha)?,
        })
    }

    /// 不透明颜色
    pub fn opaque(red: f64, green: f64, blue: f64) -> Result<Self, ColorValueError> {
        Self::new(red, green, blue, 1.0)
    }

    /// 由 8 位通道构造不透明颜色，恒在范围内
    pub fn from_rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: f64::from(red) / 255.0,
            green: f64::from(green) / 255.0,
            blue: f64::from(blue) / 255.0,
            alpha: 1.0,
        }
    }

    /// 色彩空间换算的输出。
    ///
    /// 换算公式在数学上保证落在 `[0, 1]`，这里只吸收浮点运算的末位误差
    /// （如 `1.0000000000000002`）。
    pub(crate) fn from_conversion(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
            alpha: 1.0,
        }
    }

    pub fn red(&self) -> f64 {
        self.red
    }

    pub fn green(&self) -> f64 {
        self.green
    }

    pub fn blue(&self) -> f64 {
        self.blue
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// 按 255 缩放并四舍五入（远离零）得到 8 位通道
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        (quantize8(self.red), quantize8(self.green), quantize8(self.blue))
    }

    pub fn format(&self, format: ColorFormat) -> String {
        encode(self, format)
    }
}

fn quantize8(component: f64) -> u8 {
    (component * 255.0).round() as u8
}

/// 颜色文本格式
///
/// 序列化名称（`"HEX"` 等）同时用于配置文件，新增变体会改变存储格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorFormat {
    #[default]
    #[serde(rename = "HEX")]
    Hex,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "HSL")]
    Hsl,
    #[serde(rename = "HSB")]
    Hsb,
}

impl ColorFormat {
    /// 解析优先级顺序
    pub const ALL: [ColorFormat; 4] = [
        ColorFormat::Hex,
        ColorFormat::Rgb,
        ColorFormat::Hsl,
        ColorFormat::Hsb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorFormat::Hex => "HEX",
            ColorFormat::Rgb => "RGB",
            ColorFormat::Hsl => "HSL",
            ColorFormat::Hsb => "HSB",
        }
    }
}

impl fmt::Display for ColorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知的颜色格式: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for ColorFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ColorFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownFormat(name.to_string()))
    }
}
