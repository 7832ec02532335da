//! 事件关联服务 - 业务能力层
//!
//! 订阅页面的网络响应流，从匹配提交端点的响应中提取视频 ID，
//! 并触发单槽完成事件。监听器与主流程并发运行，
//! 其处理函数是全量不抛错的：解析失败一律静默忽略，
//! 唯一允许的副作用是设置完成事件。

use crate::error::AppError;
use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::network::{
    EventResponseReceived, GetResponseBodyParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::error::Elapsed;
use tokio::time::timeout;
use tracing::debug;

/// 任务提交端点的匹配子串
const VIDEO_ENDPOINT_PATTERN: &str = "generate/video";

/// 提交端点响应的外层结构
#[derive(Debug, Deserialize)]
struct VideoCreateEnvelope {
    #[serde(default)]
    data: Option<VideoCreateData>,
}

#[derive(Debug, Deserialize)]
struct VideoCreateData {
    /// 视频 ID，线上观察到字符串和数字两种形态
    #[serde(default)]
    id: Option<JsonValue>,
}

#[derive(Debug, Default)]
struct SignalState {
    video_id: Option<String>,
    fired: bool,
}

struct SignalInner {
    state: Mutex<SignalState>,
    notify: Notify,
}

/// 单槽、单消费者的完成事件
///
/// 不变量：任意时刻至多存在一个未被消费的触发；
/// `wait` 成功返回时事件已被消费并清除，下一次等待不会被陈旧信号满足
#[derive(Clone)]
pub struct CompletionSignal {
    inner: Arc<SignalInner>,
}

impl CompletionSignal {
    /// 创建新的完成事件（初始为未触发）
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalInner {
                state: Mutex::new(SignalState::default()),
                notify: Notify::new(),
            }),
        }
    }

    /// 触发完成事件
    ///
    /// 消费前的重复触发只保留最后一次记录的 ID，不会产生第二次可观察的完成
    pub fn fire(&self, video_id: impl Into<String>) {
        {
            let mut state = self
                .inner
                .state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state.video_id = Some(video_id.into());
            state.fired = true;
        }
        self.inner.notify.notify_one();
    }

    /// 清除事件（为下一次提交重新武装）
    pub fn clear(&self) {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.video_id = None;
        state.fired = false;
    }

    /// 阻塞等待事件触发，不阻塞监听器
    ///
    /// 成功时返回记录的视频 ID 并清除事件；超时返回 Err(Elapsed)
    pub async fn wait(&self, limit: Duration) -> Result<Option<String>, Elapsed> {
        timeout(limit, async {
            loop {
                // 先登记唤醒，再检查状态，避免错过两步之间的触发
                let notified = self.inner.notify.notified();
                {
                    let mut state = self
                        .inner
                        .state
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    if state.fired {
                        state.fired = false;
                        return state.video_id.take();
                    }
                }
                notified.await;
            }
        })
        .await
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// 视频完成事件关联器
///
/// 职责：
/// - 在页面上安装恰好一个响应订阅
/// - 匹配提交端点、拉取响应体、提取视频 ID
/// - 成功时触发完成事件；其余一概忽略
pub struct VideoEventCorrelator {
    signal: CompletionSignal,
}

impl VideoEventCorrelator {
    /// 创建新的关联器
    pub fn new() -> Self {
        Self {
            signal: CompletionSignal::new(),
        }
    }

    /// 获取完成事件的句柄
    pub fn signal(&self) -> CompletionSignal {
        self.signal.clone()
    }

    /// 在页面上安装网络响应监听器
    ///
    /// 监听任务在后台运行，随响应流结束（页面关闭）而退出
    pub async fn install(&self, page: &Page) -> Result<()> {
        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(AppError::from)?;

        let page = page.clone();
        let signal = self.signal.clone();

        tokio::spawn(async move {
            while let Some(event) = responses.next().await {
                if !event.response.url.contains(VIDEO_ENDPOINT_PATTERN) {
                    continue;
                }
                if let Some(video_id) = extract_video_id(&page, &event).await {
                    debug!("捕获到视频生成响应, id: {}", video_id);
                    signal.fire(video_id);
                }
            }
            debug!("网络响应监听器已退出");
        });

        Ok(())
    }
}

impl Default for VideoEventCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

/// 从匹配的响应中提取视频 ID
///
/// 尽力而为：响应体不可得、非文本载荷、JSON 结构不符都返回 None
async fn extract_video_id(page: &Page, event: &EventResponseReceived) -> Option<String> {
    let body = page
        .execute(GetResponseBodyParams::new(event.request_id.clone()))
        .await
        .ok()?;
    if body.base64_encoded {
        return None;
    }

    let envelope: VideoCreateEnvelope = serde_json::from_str(&body.body).ok()?;
    match envelope.data?.id? {
        JsonValue::String(s) if !s.is_empty() => Some(s),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_wait_consumes_and_clears() {
        let signal = CompletionSignal::new();
        signal.fire("video-1");

        let id = signal.wait(SHORT).await.expect("应该立即返回");
        assert_eq!(id.as_deref(), Some("video-1"));

        // 消费后事件已清除，下一次等待不会被陈旧信号满足
        assert!(signal.wait(SHORT).await.is_err());
    }

    #[tokio::test]
    async fn test_double_fire_single_completion() {
        let signal = CompletionSignal::new();
        signal.fire("video-1");
        signal.fire("video-2");

        let id = signal.wait(SHORT).await.expect("应该立即返回");
        assert_eq!(id.as_deref(), Some("video-2"));

        // 两次触发只产生一次可观察的完成
        assert!(signal.wait(SHORT).await.is_err());
    }

    #[tokio::test]
    async fn test_clear_discards_stale_fire() {
        let signal = CompletionSignal::new();
        signal.fire("stale");
        signal.clear();

        assert!(signal.wait(SHORT).await.is_err());
    }

    #[tokio::test]
    async fn test_wait_wakes_on_concurrent_fire() {
        let signal = CompletionSignal::new();
        let firer = signal.clone();

        let waiter = tokio::spawn(async move { signal.wait(Duration::from_secs(5)).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        firer.fire("video-9");

        let id = waiter
            .await
            .expect("等待任务不应 panic")
            .expect("应该在超时前被唤醒");
        assert_eq!(id.as_deref(), Some("video-9"));
    }

    #[tokio::test]
    async fn test_wait_times_out_when_never_fired() {
        let signal = CompletionSignal::new();
        assert!(signal.wait(SHORT).await.is_err());
    }
}
