//! 任务处理上下文
//!
//! 封装"我正在处理第几个条目、对应哪个文件"这一信息

use std::fmt::Display;

/// 任务处理上下文
#[derive(Debug, Clone)]
pub struct JobCtx {
    /// 条目索引（从1开始，仅用于日志显示）
    pub item_index: usize,

    /// 源文件名
    pub file_name: String,
}

impl JobCtx {
    /// 创建新的任务上下文
    pub fn new(item_index: usize, file_name: impl Into<String>) -> Self {
        Self {
            item_index,
            file_name: file_name.into(),
        }
    }
}

impl Display for JobCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[任务 {} 文件#{}]", self.item_index, self.file_name)
    }
}
