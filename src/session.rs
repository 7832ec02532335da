//! 浏览器会话管理
//!
//! Session 是一个显式持有的值，由编排层独占拥有并传递给各组件，
//! 不做模块级单例。生命周期：连接时初始化，批处理结束或首个
//! 致命错误时关闭；Closed 是终态，重试必须构造新的 Session。

use crate::browser;
use crate::config::Config;
use crate::error::AppError;
use crate::services::{CompletionSignal, VideoEventCorrelator};
use anyhow::Result;
use chromiumoxide::{Browser, Page};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 会话生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// 尚未连接
    Unconnected,
    /// 已连接，页面与监听器就绪
    Connected,
    /// 已关闭（终态，不可逆）
    Closed,
}

/// 浏览器会话
///
/// 持有与远程浏览器的连接、唯一的自动化页面、后台事件泵，
/// 以及安装在页面上的完成事件句柄
pub struct Session {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
    signal: CompletionSignal,
    state: LifecycleState,
}

impl Session {
    /// 建立会话
    ///
    /// 连接到已在运行的浏览器，打开一个页面，并在返回之前把
    /// 事件关联器的监听器安装到该页面上。中途失败会释放已获取的资源
    pub async fn open(config: &Config) -> Result<Self> {
        let (browser, page, handler_task) = browser::connect_to_browser_and_page(
            &config.browser_endpoint,
            Duration::from_secs(config.connect_timeout_secs),
        )
        .await?;

        let correlator = VideoEventCorrelator::new();
        let mut session = Self {
            browser: Some(browser),
            page: Some(page),
            handler_task: Some(handler_task),
            signal: correlator.signal(),
            state: LifecycleState::Unconnected,
        };

        // 监听器必须在会话可用之前装好，否则首个任务可能错过完成事件
        let installed = match session.page.as_ref() {
            Some(page) => correlator.install(page).await,
            None => Ok(()),
        };
        if let Err(e) = installed {
            session.close().await;
            return Err(e);
        }

        session.state = LifecycleState::Connected;
        info!("✅ 浏览器会话已建立");
        Ok(session)
    }

    /// 获取自动化页面
    pub fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| AppError::Other("会话中没有可用页面".to_string()).into())
    }

    /// 获取完成事件的句柄
    pub fn signal(&self) -> CompletionSignal {
        self.signal.clone()
    }

    /// 当前生命周期状态
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// 导航到目标页面（有界超时）
    pub async fn navigate(&self, url: &str, limit: Duration) -> Result<()> {
        let page = self.page()?;

        tokio::time::timeout(limit, page.goto(url))
            .await
            .map_err(|elapsed| AppError::navigation_failed(url, elapsed))?
            .map_err(|e| AppError::navigation_failed(url, e))?;

        info!("页面已加载: {}", url);
        Ok(())
    }

    /// 关闭会话
    ///
    /// 依次释放页面、浏览器句柄、事件泵；单项释放失败只记录日志，
    /// 不阻止后续释放。对部分初始化或已关闭的会话调用是安全的空操作
    pub async fn close(&mut self) {
        if self.state == LifecycleState::Closed {
            return;
        }

        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                warn!("释放页面失败: {}", e);
            }
        }

        if let Some(browser) = self.browser.take() {
            // 只断开 CDP 连接；浏览器进程属于用户，不能随会话结束
            drop(browser);
        }

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        self.state = LifecycleState::Closed;
        info!("浏览器会话已关闭");
    }
}
