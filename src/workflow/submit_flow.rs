//! 提交流程 - 流程层
//!
//! 核心职责：定义"一个视频生成任务"的完整提交流程
//!
//! 流程顺序：
//! 1. 无操作哨兵 → 直接返回，零页面交互
//! 2. 校验图片路径 → 上传图片 → 等待上传完成（指示器消失 + 安定延迟）
//! 3. 填入提示词 → 点击生成按钮
//! 4. 等待完成事件（有界超时，超时可恢复）

use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{error, info};

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::PageOps;
use crate::models::JobRequest;
use crate::services::CompletionSignal;
use crate::workflow::job_ctx::JobCtx;

/// 上传入口
const UPLOAD_ENTRY: &str = "div.relative.cursor-pointer.group";
/// 上传控件内部的文件输入框
const UPLOAD_FILE_INPUT: &str = "div.ant-upload.ant-upload-select input[type='file']";
/// 图片上传中的加载指示器
const UPLOAD_LOADING: &str = r#"img[alt="hai luo ai video light loading"]"#;
/// 提示词输入框
const PROMPT_INPUT: &str = "textarea.ant-input.css-o72qen";
/// 生成按钮
const CREATE_BUTTON: &str = "div.create-btn-container div.create-btn";

/// 单个任务的提交结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 远端确认完成，附带捕获到的视频 ID
    Completed(Option<String>),
    /// 等待完成事件超时（可恢复，批处理继续）
    TimedOut,
    /// 无操作请求，未做任何页面交互
    Skipped,
}

/// 校验图片路径指向一个存在的普通文件
///
/// 必须在任何页面交互之前调用
pub fn validate_image_path(image_path: &Path) -> Result<()> {
    if !image_path.is_file() {
        return Err(AppError::invalid_image_path(image_path.to_string_lossy()).into());
    }
    Ok(())
}

/// 提交流程
///
/// - 编排单个任务的完整提交步骤
/// - 每一步有确定性 UI 信号时用等待门禁，而不是固定睡眠
/// - 不持有任何资源（page）
/// - 只依赖业务能力（完成事件句柄）
pub struct SubmitFlow {
    signal: CompletionSignal,
    poll_interval: Duration,
    settle_delay: Duration,
    upload_wait_limit: Duration,
    video_timeout: Duration,
}

impl SubmitFlow {
    /// 创建新的提交流程
    pub fn new(config: &Config, signal: CompletionSignal) -> Self {
        Self {
            signal,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            settle_delay: Duration::from_secs(config.settle_delay_secs),
            upload_wait_limit: Duration::from_secs(config.page_timeout_secs),
            video_timeout: Duration::from_secs(config.video_timeout_secs),
        }
    }

    /// 执行完整的提交流程
    ///
    /// 步骤 2-5 中的元素查找失败只对本任务致命，由调用方转换为条目状态
    pub async fn run(
        &self,
        ops: &PageOps,
        request: &JobRequest,
        ctx: &JobCtx,
    ) -> Result<SubmitOutcome> {
        // 无操作哨兵：显式的调用方约定，直接返回
        if request.is_noop() {
            info!("[任务 {}] 无操作请求，跳过页面交互", ctx.item_index);
            return Ok(SubmitOutcome::Skipped);
        }

        if let Some(image_path) = &request.image_path {
            // 在任何页面交互之前校验路径
            validate_image_path(image_path)?;

            self.upload_image(ops, image_path, ctx).await?;
            self.wait_for_upload_complete(ops, ctx).await?;
        }

        self.fill_prompt(ops, &request.prompt, ctx).await?;
        self.submit(ops, ctx).await?;

        Ok(self.await_completion(ctx).await)
    }

    /// 上传图片：打开上传入口，向文件输入框提供文件
    async fn upload_image(&self, ops: &PageOps, image_path: &Path, ctx: &JobCtx) -> Result<()> {
        info!(
            "[任务 {}] 📤 正在上传图片: {}",
            ctx.item_index,
            image_path.display()
        );

        ops.click(UPLOAD_ENTRY).await?;
        // 上传面板展开没有确定性信号，等一个固定间隔
        sleep(self.poll_interval).await;

        ops.supply_file(UPLOAD_FILE_INPUT, image_path).await?;
        Ok(())
    }

    /// 等待图片上传完成
    ///
    /// 等加载指示器消失（上限很长，第三方处理可能非常慢），
    /// 然后追加固定的安定延迟：指示器会比资产真正挂载提前一点消失
    async fn wait_for_upload_complete(&self, ops: &PageOps, ctx: &JobCtx) -> Result<()> {
        let deadline = Instant::now() + self.upload_wait_limit;

        while !ops.is_hidden(UPLOAD_LOADING).await {
            if Instant::now() >= deadline {
                error!("[任务 {}] 等待图片上传完成超时", ctx.item_index);
                return Err(AppError::upload_timeout(self.upload_wait_limit.as_secs()).into());
            }
            sleep(self.poll_interval).await;
        }

        sleep(self.settle_delay).await;
        info!("[任务 {}] ✓ 图片上传完成", ctx.item_index);
        Ok(())
    }

    /// 填入提示词
    async fn fill_prompt(&self, ops: &PageOps, prompt: &str, ctx: &JobCtx) -> Result<()> {
        info!("[任务 {}] 正在填入提示词", ctx.item_index);
        ops.fill(PROMPT_INPUT, prompt).await?;
        Ok(())
    }

    /// 点击生成按钮
    ///
    /// 点击前清除完成事件，保证本次等待不会被上一个任务的陈旧信号满足
    async fn submit(&self, ops: &PageOps, ctx: &JobCtx) -> Result<()> {
        self.signal.clear();
        ops.click(CREATE_BUTTON).await?;
        info!("[任务 {}] 📤 已触发视频生成", ctx.item_index);
        Ok(())
    }

    /// 等待完成事件
    ///
    /// 超时不是错误：记录日志并返回 TimedOut，批处理继续处理下一个条目
    async fn await_completion(&self, ctx: &JobCtx) -> SubmitOutcome {
        match self.signal.wait(self.video_timeout).await {
            Ok(video_id) => {
                info!(
                    "[任务 {}] ✓ 视频生成已确认, id: {:?}",
                    ctx.item_index, video_id
                );
                SubmitOutcome::Completed(video_id)
            }
            Err(_) => {
                error!(
                    "[任务 {}] 视频生成超时 ({}秒)",
                    ctx.item_index,
                    self.video_timeout.as_secs()
                );
                SubmitOutcome::TimedOut
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use std::path::PathBuf;

    #[test]
    fn test_validate_missing_image_path() {
        let missing = PathBuf::from("/nonexistent/hailuo/image.png");
        let err = validate_image_path(&missing).expect_err("不存在的路径应该失败");

        // 失败必须是 InvalidImagePath，且发生在任何页面交互之前
        let app_err = err.downcast_ref::<AppError>().expect("应该是 AppError");
        assert!(matches!(
            app_err,
            AppError::Job(JobError::InvalidImagePath { .. })
        ));
    }

    #[test]
    fn test_validate_directory_is_not_a_file() {
        let dir = std::env::temp_dir();
        assert!(validate_image_path(&dir).is_err());
    }

    #[test]
    fn test_validate_existing_file() {
        let path = std::env::temp_dir().join(format!("hailuo_flow_{}.png", std::process::id()));
        std::fs::write(&path, b"x").expect("写入测试文件失败");

        assert!(validate_image_path(&path).is_ok());

        let _ = std::fs::remove_file(&path);
    }
}
