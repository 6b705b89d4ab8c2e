//! 取色协作者
//!
//! 系统取色对话框对本库是不透明的：`ColorSampler::sample` 异步等待用户操作，
//! 返回选中的颜色，用户取消时返回 `None`（正常结果，不是错误）。
//!
//! `LineSampler` 是终端下的实现：读取一行颜色文本（四种格式均可），
//! 空行或输入结束视为取消。

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Mutex;

use crate::color::{self, ColorValue};

pub trait ColorSampler: Send + Sync {
    fn sample(&self) -> impl Future<Output = Option<ColorValue>> + Send;
}

/// 从行输入读取颜色文本的取色器
pub struct LineSampler<R> {
    reader: Mutex<R>,
}

impl<R> LineSampler<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self { reader: Mutex::new(reader) }
    }
}

impl<R> ColorSampler for LineSampler<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn sample(&self) -> Option<ColorValue> {
        let mut reader = self.reader.lock().await;
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line).await {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    log::warn!("读取取色输入失败，按取消处理: {}", err);
                    return None;
                }
            }

            if line.trim().is_empty() {
                return None;
            }
            match color::decode(&line) {
                Some(color) => return Some(color),
                None => log::warn!("无法识别的颜色: {}", line.trim()),
            }
        }
    }
}
