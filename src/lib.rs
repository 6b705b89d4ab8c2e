//! # 取色工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │          展示层（菜单栏 / 命令行，本库之外）              │
//! │     ↑ 颜色状态订阅        ↑ 忙碌状态 / 历史快照           │
//! └─────┼────────────────────┼───────────────────────────────┘
//!       │                    │
//! ┌─────┼────────────────────┼───────────────────────────────┐
//! │  clipboard::watcher   capture ── CaptureCoordinator      │
//! │   (轮询 + 解码)          │   ├─ sampler   取色协作者     │
//! │       │                  │   ├─ clipboard 写入剪贴板     │
//! │       ↓                  ↓   └─ db        HistoryStore   │
//! │   color::codec ←──── 格式化 / 解析                        │
//! │                                                          │
//! │  error ── AppError     settings ── AppSettings (JSON)    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`color`] | `ColorValue` / `ColorFormat` / `CapturedColor` 与 HEX·RGB·HSL·HSB 编解码 |
//! | [`clipboard`] | 剪贴板协作者、系统剪贴板监听、颜色轮询状态机 |
//! | [`db`] | blob 存储（SQLite / 内存）与容量受限的取色历史 |
//! | [`sampler`] | 取色协作者及终端行输入实现 |
//! | [`capture`] | 一次取色的完整流程与当前选中颜色 |
//! | [`settings`] | 默认格式、轮询周期、数据库目录等设置 |

pub mod error;
pub mod capture;
pub mod clipboard;
pub mod color;
pub mod db;
pub mod sampler;
pub mod settings;
