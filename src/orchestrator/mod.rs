//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批处理器
//! - 管理应用生命周期（初始化、运行、清理）
//! - 扫描输入目录（Vec<BatchItem>）
//! - 每个条目前执行准入门禁（额度 + 队列）
//! - 管理会话资源（Session、PageOps）
//! - 输出全局统计信息
//!
//! ### `item_processor` - 单个条目处理器
//! - 推进单个条目的状态机
//! - 委托 SubmitFlow 做页面交互
//! - 终态后搬移源文件（持久化标记）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<BatchItem>)
//!     ↓
//! item_processor (处理单个 BatchItem)
//!     ↓
//! workflow::SubmitFlow (处理单个 JobRequest)
//!     ↓
//! services (能力层：admission / correlator)
//!     ↓
//! infrastructure (基础设施：PageOps)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，item_processor 管单个
//! 2. **资源隔离**：只有编排层持有 Session 和 PageOps
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **严格串行**：上一个条目到达终态之前绝不开始下一个

pub mod batch_processor;
pub mod item_processor;

// 重新导出主要类型
pub use batch_processor::App;
pub use item_processor::process_item;
