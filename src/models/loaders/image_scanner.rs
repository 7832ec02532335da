use crate::error::AppError;
use crate::models::job::BatchItem;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

/// 待处理图片的扩展名
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// 扫描目录中的所有候选图片并转换为批处理条目列表
///
/// 只看扩展名，不递归子目录（processed 子目录因此天然被跳过）；
/// 结果按路径排序，保证多次运行的处理顺序稳定
pub async fn scan_image_folder(folder_path: &str) -> Result<Vec<BatchItem>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(AppError::directory_not_found(folder_path).into());
    }

    let mut image_paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                IMAGE_EXTENSIONS.iter().any(|e| *e == ext)
            })
            .unwrap_or(false);
        if is_image {
            image_paths.push(path);
        }
    }

    image_paths.sort();

    tracing::info!("在 {} 中找到 {} 张待处理图片", folder_path, image_paths.len());

    Ok(image_paths.into_iter().map(BatchItem::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_folder(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "hailuo_scanner_{}_{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("创建临时目录失败");
        dir
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = temp_folder("filter");
        for name in ["b.png", "a.jpg", "c.jpeg", "notes.txt", "video.mp4"] {
            fs::write(dir.join(name), b"x").expect("写入测试文件失败");
        }
        fs::create_dir_all(dir.join("processed")).expect("创建子目录失败");

        let items = tokio_test::block_on(scan_image_folder(dir.to_str().unwrap()))
            .expect("扫描应该成功");

        let names: Vec<String> = items.iter().map(|i| i.file_name()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.jpeg"]);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_scan_missing_folder_fails() {
        let result = tokio_test::block_on(scan_image_folder("/nonexistent/hailuo_folder"));
        assert!(result.is_err());
    }
}
