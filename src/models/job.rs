//! 任务数据模型
//!
//! 封装单个视频生成任务的请求与批处理条目的状态机

use std::fmt::Display;
use std::path::{Path, PathBuf};

/// 无操作提示词哨兵值
///
/// 提示词等于该值时，排序器不做任何页面交互直接返回（显式的调用方约定）
pub const NO_PROMPT: &str = "NO_PROMPT";

/// 单个视频生成请求
///
/// 构造后不可变，每个批处理条目对应一个请求
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// 提示词
    pub prompt: String,
    /// 可选的图片路径
    pub image_path: Option<PathBuf>,
}

impl JobRequest {
    /// 创建新的任务请求
    pub fn new(prompt: impl Into<String>, image_path: Option<PathBuf>) -> Self {
        Self {
            prompt: prompt.into(),
            image_path,
        }
    }

    /// 该请求是否为无操作请求
    pub fn is_noop(&self) -> bool {
        self.prompt == NO_PROMPT
    }
}

/// 批处理条目状态
///
/// 状态只能向前推进：Pending → Submitted → {Completed | TimedOut | Failed}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// 等待处理
    Pending,
    /// 已通过准入门禁并交给排序器
    Submitted,
    /// 远端任务已确认完成
    Completed,
    /// 等待完成事件超时
    TimedOut,
    /// 处理失败（元素缺失、路径无效等）
    Failed,
}

impl ItemStatus {
    /// 状态机中的序号，用于保证单调推进
    fn rank(self) -> u8 {
        match self {
            ItemStatus::Pending => 0,
            ItemStatus::Submitted => 1,
            ItemStatus::Completed | ItemStatus::TimedOut | ItemStatus::Failed => 2,
        }
    }

    /// 是否为终态
    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ItemStatus::Pending => "等待处理",
            ItemStatus::Submitted => "已提交",
            ItemStatus::Completed => "已完成",
            ItemStatus::TimedOut => "已超时",
            ItemStatus::Failed => "已失败",
        };
        write!(f, "{}", label)
    }
}

/// 批处理条目
///
/// 由外部输入目录枚举得到；到达终态后源文件被移入 processed 目录，
/// 这一搬移就是持久化标记，重启后不会重复处理
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// 源图片路径
    pub source_path: PathBuf,
    /// 当前状态
    pub status: ItemStatus,
}

impl BatchItem {
    /// 从源路径创建待处理条目
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            status: ItemStatus::Pending,
        }
    }

    /// 条目的文件名（用于日志）
    pub fn file_name(&self) -> String {
        Path::new(&self.source_path)
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }

    /// 单调推进状态；倒退的转换被忽略
    pub fn transition(&mut self, next: ItemStatus) {
        if next.rank() >= self.status.rank() {
            self.status = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_sentinel() {
        let noop = JobRequest::new(NO_PROMPT, None);
        assert!(noop.is_noop());

        let normal = JobRequest::new("一段提示词", Some(PathBuf::from("a.png")));
        assert!(!normal.is_noop());
    }

    #[test]
    fn test_status_transitions_are_monotonic() {
        let mut item = BatchItem::new("a.png");
        assert_eq!(item.status, ItemStatus::Pending);

        item.transition(ItemStatus::Submitted);
        assert_eq!(item.status, ItemStatus::Submitted);

        item.transition(ItemStatus::TimedOut);
        assert_eq!(item.status, ItemStatus::TimedOut);

        // 终态后不允许倒退
        item.transition(ItemStatus::Pending);
        assert_eq!(item.status, ItemStatus::TimedOut);
        item.transition(ItemStatus::Submitted);
        assert_eq!(item.status, ItemStatus::TimedOut);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ItemStatus::Pending.is_terminal());
        assert!(!ItemStatus::Submitted.is_terminal());
        assert!(ItemStatus::Completed.is_terminal());
        assert!(ItemStatus::TimedOut.is_terminal());
        assert!(ItemStatus::Failed.is_terminal());
    }
}
