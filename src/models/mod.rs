//! 数据模型层
//!
//! 任务请求、批处理条目状态机与输入目录扫描

pub mod job;
pub mod loaders;

pub use job::{BatchItem, ItemStatus, JobRequest, NO_PROMPT};
pub use loaders::image_scanner::scan_image_folder;
