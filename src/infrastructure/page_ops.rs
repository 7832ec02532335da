//! 页面操作器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"查找/点击/填入/上传"等能力

use crate::error::AppError;
use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::{Element, Page};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// 有界等待中两次查找之间的间隔
const FIND_RETRY_INTERVAL: Duration = Duration::from_millis(200);

/// 页面操作器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 查找返回 Option，不以异常表达"元素不存在"
/// - 不认识 JobRequest / BatchItem
/// - 不处理业务流程
pub struct PageOps {
    page: Page,
    element_wait: Duration,
}

impl PageOps {
    /// 创建新的页面操作器
    pub fn new(page: Page, element_wait: Duration) -> Self {
        Self { page, element_wait }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 立即查找元素，不存在时返回 None
    pub async fn find(&self, selector: &str) -> Option<Element> {
        self.page.find_element(selector).await.ok()
    }

    /// 有界等待地查找元素
    ///
    /// 以固定间隔重试查找，直到命中或超出 element_wait 上限
    pub async fn wait_for(&self, selector: &str) -> Option<Element> {
        let deadline = Instant::now() + self.element_wait;
        loop {
            if let Some(element) = self.find(selector).await {
                return Some(element);
            }
            if Instant::now() >= deadline {
                return None;
            }
            sleep(FIND_RETRY_INTERVAL).await;
        }
    }

    /// 读取元素的文本内容
    pub async fn text_of(&self, selector: &str) -> Option<String> {
        let element = self.wait_for(selector).await?;
        element.inner_text().await.ok().flatten()
    }

    /// 点击元素
    pub async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .wait_for(selector)
            .await
            .ok_or_else(|| AppError::element_not_found(selector))?;
        element.click().await.map_err(AppError::from)?;
        Ok(())
    }

    /// 向输入元素填入文本（替换语义：先清空再输入）
    pub async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .wait_for(selector)
            .await
            .ok_or_else(|| AppError::element_not_found(selector))?;
        element.click().await.map_err(AppError::from)?;
        // 上一个任务的提示词可能还留在输入框里
        element
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .map_err(AppError::from)?;
        element.type_str(text).await.map_err(AppError::from)?;
        Ok(())
    }

    /// 向文件输入框提供本地文件（DOM.setFileInputFiles）
    pub async fn supply_file(&self, selector: &str, file_path: &Path) -> Result<()> {
        let element = self
            .wait_for(selector)
            .await
            .ok_or_else(|| AppError::element_not_found(selector))?;

        let params = SetFileInputFilesParams::builder()
            .file(file_path.to_string_lossy())
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(|e| AppError::Other(format!("构造文件上传命令失败: {}", e)))?;

        self.page.execute(params).await.map_err(AppError::from)?;
        Ok(())
    }

    /// 元素当前是否不可见
    ///
    /// 元素不在 DOM 中，或没有布局盒（display:none 等），都视为不可见；
    /// 查找本身失败时同样按不可见处理，与"等待消失"的语义一致
    pub async fn is_hidden(&self, selector: &str) -> bool {
        match self.page.find_elements(selector).await {
            Ok(elements) if elements.is_empty() => true,
            Ok(elements) => {
                for element in elements {
                    if element.bounding_box().await.is_ok() {
                        return false;
                    }
                }
                true
            }
            Err(_) => true,
        }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 统计页面中包含指定文本的元素个数
    ///
    /// 查找或求值失败时返回 None，由调用方决定失败语义
    pub async fn count_text_occurrences(&self, phrase: &str) -> Option<usize> {
        let js_code = format!(
            r#"
            (() => {{
                const result = document.evaluate(
                    'count(//*[contains(text(), "{}")])',
                    document,
                    null,
                    XPathResult.NUMBER_TYPE,
                    null
                );
                return result.numberValue;
            }})()
            "#,
            phrase
        );

        match self.eval(js_code).await {
            Ok(value) => value.as_f64().map(|n| n as usize),
            Err(_) => None,
        }
    }
}
