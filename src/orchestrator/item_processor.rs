//! 单个条目处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责单个批处理条目的状态机推进：
//!
//! 1. **状态推进**：Pending → Submitted → {Completed | TimedOut | Failed}
//! 2. **流程委托**：把实际的页面交互交给 `SubmitFlow`
//! 3. **结果归类**：流程结果与流程错误都收敛为条目终态
//! 4. **持久化标记**：终态后把源文件移入 processed 目录
//!
//! 搬移是终态的持久化副作用，放在所有交互与等待之后：
//! 搬移前崩溃意味着条目会在下次运行时重试，重试因此是安全的

use crate::error::AppError;
use crate::infrastructure::PageOps;
use crate::models::{BatchItem, ItemStatus, JobRequest};
use crate::workflow::{JobCtx, SubmitFlow, SubmitOutcome};
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// 处理单个批处理条目
///
/// 流程中的错误（元素缺失、路径无效、上传超时）只对本条目致命：
/// 记录日志、条目标记为 Failed，批处理继续
pub async fn process_item(
    ops: &PageOps,
    flow: &SubmitFlow,
    item: &mut BatchItem,
    request: &JobRequest,
    ctx: &JobCtx,
    processed_dir: &Path,
) -> Result<ItemStatus> {
    item.transition(ItemStatus::Submitted);

    let status = match flow.run(ops, request, ctx).await {
        Ok(outcome) => terminal_status(&outcome),
        Err(e) => {
            error!(
                "[任务 {}] ❌ 处理失败 ({}): {}",
                ctx.item_index, ctx.file_name, e
            );
            ItemStatus::Failed
        }
    };

    item.transition(status);

    // 每个终态（包括超时）都搬移源文件，否则该条目会被无限重复处理
    relocate_to_processed(item, processed_dir)?;

    info!(
        "[任务 {}] 条目 {} 终态: {}",
        ctx.item_index, ctx.file_name, item.status
    );

    Ok(item.status)
}

/// 把提交结果映射为条目终态
///
/// 无操作请求视为条目已消费：源文件照常搬移，
/// 重启后不会反复遇到同一个已知的无操作条目
pub fn terminal_status(outcome: &SubmitOutcome) -> ItemStatus {
    match outcome {
        SubmitOutcome::Completed(_) => ItemStatus::Completed,
        SubmitOutcome::TimedOut => ItemStatus::TimedOut,
        SubmitOutcome::Skipped => ItemStatus::Completed,
    }
}

/// 把已处理条目的源文件移入 processed 目录
pub fn relocate_to_processed(item: &BatchItem, processed_dir: &Path) -> Result<PathBuf> {
    let target = processed_dir.join(item.file_name());

    fs::rename(&item.source_path, &target).map_err(|e| {
        AppError::move_failed(
            item.source_path.to_string_lossy(),
            target.to_string_lossy(),
            e,
        )
    })?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_status_mapping() {
        assert_eq!(
            terminal_status(&SubmitOutcome::Completed(Some("v1".to_string()))),
            ItemStatus::Completed
        );
        assert_eq!(
            terminal_status(&SubmitOutcome::Completed(None)),
            ItemStatus::Completed
        );
        // 超时也是终态，条目同样要被搬移
        assert_eq!(
            terminal_status(&SubmitOutcome::TimedOut),
            ItemStatus::TimedOut
        );
        assert_eq!(
            terminal_status(&SubmitOutcome::Skipped),
            ItemStatus::Completed
        );
    }

    fn temp_batch_folder(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "hailuo_relocate_{}_{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("processed")).expect("创建临时目录失败");
        dir
    }

    #[test]
    fn test_relocate_moves_file() {
        let dir = temp_batch_folder("move");
        let source = dir.join("a.png");
        fs::write(&source, b"x").expect("写入测试文件失败");

        let item = BatchItem::new(&source);
        let target = relocate_to_processed(&item, &dir.join("processed")).expect("搬移应该成功");

        assert!(!source.exists());
        assert!(target.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_relocate_missing_source_fails() {
        let dir = temp_batch_folder("missing");
        let item = BatchItem::new(dir.join("ghost.png"));

        assert!(relocate_to_processed(&item, &dir.join("processed")).is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_relocate_round_trip_partitions_input_set() {
        let dir = temp_batch_folder("round_trip");
        let names = ["a.png", "b.png", "c.png", "d.png"];
        for name in names {
            fs::write(dir.join(name), b"x").expect("写入测试文件失败");
        }

        // 模拟一次中途被额度耗尽打断的运行：前两个条目到达终态并被搬移
        for name in &names[..2] {
            let item = BatchItem::new(dir.join(name));
            relocate_to_processed(&item, &dir.join("processed")).expect("搬移应该成功");
        }

        let mut processed: Vec<String> = fs::read_dir(dir.join("processed"))
            .expect("读取 processed 目录失败")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        let mut remaining: Vec<String> = fs::read_dir(&dir)
            .expect("读取源目录失败")
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();

        // 已搬移 ∪ 未处理 = 原始输入集合，每个文件恰好出现一次
        processed.sort();
        remaining.sort();
        assert_eq!(processed, vec!["a.png", "b.png"]);
        assert_eq!(remaining, vec!["c.png", "d.png"]);

        let _ = fs::remove_dir_all(&dir);
    }
}
