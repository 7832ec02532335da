//! 准入控制服务 - 业务能力层
//!
//! 提交新任务前检查两项相互独立的服务端约束：剩余额度与队列深度。
//! 两项检查的失败语义是不对称的，并且是有意保留的：
//! - 额度检查失败 → 返回 false（fail-closed）：额度无法确认时绝不提交
//! - 队列检查失败 → 返回 true（fail-open）：探测不到拥塞不应让批处理永久停摆
//!
//! 服务端状态是唯一事实来源，每次轮询都重新读取，从不跨轮询缓存

use crate::config::Config;
use crate::infrastructure::PageOps;
use anyhow::Result;
use regex::Regex;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

/// 剩余额度计数器
const QUOTA_COUNTER: &str = "span.select-none.font-light";

/// 队列拥塞的三类状态短语
const QUEUE_PHRASES: [&str; 3] = [
    "Video generation is in progress",
    "expected to wait for",
    "Queuing",
];

/// 准入控制器
///
/// 职责：
/// - 读取页面上的额度计数器并判断是否足够
/// - 统计队列状态短语并判断是否有空位
/// - 以固定间隔轮询等待队列空位（带总时限）
pub struct AdmissionController {
    quota_floor: i64,
    queue_busy_threshold: usize,
    poll_interval: Duration,
    queue_wait_timeout: Duration,
}

impl AdmissionController {
    /// 创建新的准入控制器
    pub fn new(config: &Config) -> Self {
        Self {
            quota_floor: config.quota_floor,
            queue_busy_threshold: config.queue_busy_threshold,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            queue_wait_timeout: Duration::from_secs(config.queue_wait_timeout_secs),
        }
    }

    /// 检查额度是否足够
    ///
    /// 任何查找或解析失败都视为额度不可用，返回 false
    pub async fn check_quota(&self, ops: &PageOps) -> bool {
        let content = ops.text_of(QUOTA_COUNTER).await;
        debug!("额度计数器内容: {:?}", content);
        self.quota_from_text(content.as_deref())
    }

    /// 从计数器文本判断额度是否足够（纯判定，便于测试）
    pub fn quota_from_text(&self, content: Option<&str>) -> bool {
        let Some(content) = content else {
            return false;
        };
        let Ok(re) = Regex::new(r"\d+") else {
            return false;
        };
        let Some(matched) = re.find(content) else {
            return false;
        };
        matched
            .as_str()
            .parse::<i64>()
            .map(|n| n > self.quota_floor)
            .unwrap_or(false)
    }

    /// 检查队列是否有空位
    ///
    /// 统计三类状态短语的合计出现次数；任何统计失败都视为有空位（fail-open）
    pub async fn check_queue_status(&self, ops: &PageOps) -> bool {
        let mut total = 0usize;
        for phrase in QUEUE_PHRASES {
            match ops.count_text_occurrences(phrase).await {
                Some(count) => total += count,
                None => return self.queue_has_room(None),
            }
        }
        self.queue_has_room(Some(total))
    }

    /// 从合计次数判断是否有空位（纯判定，便于测试）
    pub fn queue_has_room(&self, total: Option<usize>) -> bool {
        match total {
            Some(count) => count < self.queue_busy_threshold,
            None => true,
        }
    }

    /// 等待队列出现空位
    ///
    /// 以固定间隔轮询，带总时限；超出时限返回错误，整个批处理随之终止
    pub async fn wait_for_queue_slot(&self, ops: &PageOps) -> Result<()> {
        let started = Instant::now();
        loop {
            if self.check_queue_status(ops).await {
                return Ok(());
            }
            if started.elapsed() >= self.queue_wait_timeout {
                warn!("等待队列空位超过 {} 秒", self.queue_wait_timeout.as_secs());
                return Err(
                    crate::error::AppError::queue_wait_exceeded(self.queue_wait_timeout.as_secs())
                        .into(),
                );
            }
            info!("队列已满，等待中...");
            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_controller() -> AdmissionController {
        AdmissionController::new(&Config::default())
    }

    #[test]
    fn test_quota_fail_closed() {
        let controller = create_test_controller();

        // 计数器缺失或不含数字时必须判为额度不可用
        assert!(!controller.quota_from_text(None));
        assert!(!controller.quota_from_text(Some("")));
        assert!(!controller.quota_from_text(Some("暂无数据")));
    }

    #[test]
    fn test_quota_threshold() {
        let controller = create_test_controller();

        assert!(controller.quota_from_text(Some("45")));
        assert!(!controller.quota_from_text(Some("10")));
        // 下限取严格大于
        assert!(!controller.quota_from_text(Some("30")));
        assert!(controller.quota_from_text(Some("31")));
    }

    #[test]
    fn test_quota_with_decorated_text() {
        let controller = create_test_controller();

        assert!(controller.quota_from_text(Some("剩余 45 次")));
        assert!(!controller.quota_from_text(Some("剩余 3 次")));
    }

    #[test]
    fn test_queue_fail_open() {
        let controller = create_test_controller();

        // 统计失败时必须判为有空位
        assert!(controller.queue_has_room(None));
    }

    #[test]
    fn test_queue_threshold() {
        let controller = create_test_controller();

        assert!(controller.queue_has_room(Some(0)));
        assert!(controller.queue_has_room(Some(2)));
        assert!(!controller.queue_has_room(Some(3)));
        assert!(!controller.queue_has_room(Some(5)));
    }
}
