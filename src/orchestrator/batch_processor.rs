//! 批处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量条目的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、建立会话、打开目标站点
//! 2. **批量加载**：扫描输入目录得到待处理条目（`Vec<BatchItem>`）
//! 3. **准入门禁**：每个条目开始前检查额度与队列
//! 4. **严格串行**：同一页面上绝不并发提交，UI 序列一次只跑一个任务
//! 5. **资源管理**：持有 Session，退出前无论哪条错误路径都尝试关闭
//! 6. **全局统计**：汇总所有条目的终态
//!
//! ## 终止策略
//!
//! - 额度耗尽 → 整个批处理提前终止，剩余条目保持未处理（不搬移）
//! - 队列拥塞 → 轮询等待（带总时限），不是错误
//! - 其余条目级失败 → 记录后继续处理下一个条目

use crate::config::Config;
use crate::infrastructure::PageOps;
use crate::models::{self, ItemStatus, JobRequest};
use crate::orchestrator::item_processor;
use crate::services::AdmissionController;
use crate::session::Session;
use crate::workflow::{JobCtx, SubmitFlow};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// 已处理条目的子目录名
const PROCESSED_DIR: &str = "processed";

/// 应用主结构
pub struct App {
    config: Config,
    session: Session,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config)?;

        log_startup(&config);

        // 建立会话（连接浏览器、打开页面、安装监听器）
        let mut session = Session::open(&config).await?;

        // 打开目标站点
        if let Err(e) = session
            .navigate(&config.base_url, Duration::from_secs(config.page_timeout_secs))
            .await
        {
            session.close().await;
            return Err(e);
        }

        // 页面加载后等一个间隔再开始操作
        sleep(Duration::from_secs(config.poll_interval_secs)).await;

        Ok(Self { config, session })
    }

    /// 运行应用主逻辑
    ///
    /// 无论处理成功与否，退出前都尝试关闭会话
    pub async fn run(&mut self) -> Result<()> {
        let result = self.process_batch().await;
        self.session.close().await;
        result
    }

    /// 处理整个批次
    async fn process_batch(&self) -> Result<()> {
        // 加载所有待处理的条目
        info!("\n📁 正在扫描待处理的图片...");
        let items = models::scan_image_folder(&self.config.image_folder).await?;

        if items.is_empty() {
            warn!("⚠️ 没有找到待处理的图片，程序结束");
            return Ok(());
        }

        let processed_dir = Path::new(&self.config.image_folder).join(PROCESSED_DIR);
        fs::create_dir_all(&processed_dir)
            .with_context(|| format!("无法创建目录: {}", processed_dir.display()))?;

        let total = items.len();
        log_items_loaded(total, &self.config);

        let ops = PageOps::new(
            self.session.page()?.clone(),
            Duration::from_secs(self.config.element_wait_secs),
        );
        let admission = AdmissionController::new(&self.config);
        let flow = SubmitFlow::new(&self.config, self.session.signal());

        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        for (idx, mut item) in items.into_iter().enumerate() {
            let ctx = JobCtx::new(idx + 1, item.file_name());
            log_item_start(&ctx, total);

            // 额度门禁：额度无法确认或已耗尽时，剩余批次不再有条目可提交
            if !admission.check_quota(&ops).await {
                warn!(
                    "⚠️ 没有可用额度了，终止批处理（剩余 {} 个条目保持未处理）",
                    total - idx
                );
                stats.quota_halted = true;
                break;
            }

            // 队列门禁：拥塞时按固定间隔轮询，超过总时限则放弃整个运行
            admission.wait_for_queue_slot(&ops).await?;

            let request = JobRequest::new(
                self.config.prompt.clone(),
                Some(item.source_path.clone()),
            );

            match item_processor::process_item(
                &ops,
                &flow,
                &mut item,
                &request,
                &ctx,
                &processed_dir,
            )
            .await
            {
                Ok(ItemStatus::Completed) => stats.completed += 1,
                Ok(ItemStatus::TimedOut) => stats.timed_out += 1,
                Ok(_) => stats.failed += 1,
                Err(e) => {
                    error!(
                        "[任务 {}] ❌ 处理过程中发生错误: {}",
                        ctx.item_index, e
                    );
                    stats.failed += 1;
                }
            }
        }

        print_final_stats(&stats, &self.config);

        Ok(())
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    completed: usize,
    timed_out: usize,
    failed: usize,
    total: usize,
    quota_halted: bool,
}

// ========== 日志辅助函数 ==========

fn init_log_file(config: &Config) -> Result<()> {
    let log_header = format!(
        "{}\n视频批量提交日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(&config.output_log_file, log_header)?;
    Ok(())
}

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量视频生成模式");
    info!("🌐 目标站点: {}", config.base_url);
    info!("🔌 浏览器端点: {}", config.browser_endpoint);
    info!("{}", "=".repeat(60));
}

fn log_items_loaded(total: usize, config: &Config) {
    info!("✓ 找到 {} 个待处理的条目", total);
    info!("📋 任务严格串行，一次只提交一个");
    info!("💡 每个条目提交前都会重新检查额度与队列\n");
    info!("📝 提示词: {}", crate::utils::logging::truncate_text(&config.prompt, 40));
}

fn log_item_start(ctx: &JobCtx, total: usize) {
    info!("\n{}", "─".repeat(30));
    info!(
        "[任务 {}] 处理第 {}/{} 个条目: {}",
        ctx.item_index, ctx.item_index, total, ctx.file_name
    );
}

fn print_final_stats(stats: &ProcessingStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 完成: {}/{}", stats.completed, stats.total);
    info!("⏱️ 超时: {}", stats.timed_out);
    info!("❌ 失败: {}", stats.failed);
    if stats.quota_halted {
        info!("⚠️ 批处理因额度耗尽提前终止");
    }
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}
