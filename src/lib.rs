//! # Hailuo Video Submit
//!
//! 驱动一个已登录的远程浏览器实例，批量提交图生视频任务的自动化程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageOps` - 唯一的 page owner，提供查找/点击/填入/上传能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个任务
//! - `AdmissionController` - 额度与队列的准入检查能力
//! - `VideoEventCorrelator` - 从网络流量中提取完成事件的能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个任务"的完整提交流程
//! - `JobCtx` - 上下文封装（条目索引 + 文件名）
//! - `SubmitFlow` - 流程编排（上传 → 等待 → 提示词 → 提交 → 等完成）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批处理器，管理会话与串行调度
//! - `orchestrator/item_processor` - 单个条目处理器，推进状态机并落盘标记
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod session;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::PageOps;
pub use models::{BatchItem, ItemStatus, JobRequest, NO_PROMPT};
pub use orchestrator::App;
pub use services::{AdmissionController, CompletionSignal, VideoEventCorrelator};
pub use session::{LifecycleState, Session};
pub use workflow::{JobCtx, SubmitFlow, SubmitOutcome};
