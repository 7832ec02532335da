use crate::error::AppError;
use anyhow::Result;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// 连接到已在运行的浏览器并获取页面
///
/// 端点指向一个已经登录的浏览器实例；连接受 `connect_timeout` 约束。
/// 返回的 JoinHandle 是后台的 CDP 事件泵，连接断开时自行退出
pub async fn connect_to_browser_and_page(
    endpoint: &str,
    connect_timeout: Duration,
) -> Result<(Browser, Page, JoinHandle<()>)> {
    info!("正在连接到浏览器: {}", endpoint);

    let connected = tokio::time::timeout(connect_timeout, Browser::connect(endpoint))
        .await
        .map_err(|e| {
            error!("连接浏览器超时 ({}秒)", connect_timeout.as_secs());
            AppError::connection_failed(endpoint, e)
        })?;

    let (browser, mut handler) = connected.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::connection_failed(endpoint, e)
    })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(Duration::from_millis(300)).await;

    // 在第一个可用的浏览上下文中打开一个页面
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        AppError::page_creation_failed(e)
    })?;
    debug!("页面创建成功");

    Ok((browser, page, handler_task))
}
