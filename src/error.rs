use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 浏览器相关错误
    Browser(BrowserError),
    /// 单个任务的错误
    Job(JobError),
    /// 准入控制错误
    Admission(AdmissionError),
    /// 文件操作错误
    File(FileError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Browser(e) => write!(f, "浏览器错误: {}", e),
            AppError::Job(e) => write!(f, "任务错误: {}", e),
            AppError::Admission(e) => write!(f, "准入错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Browser(e) => Some(e),
            AppError::Job(e) => Some(e),
            AppError::Admission(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 浏览器相关错误
#[derive(Debug)]
pub enum BrowserError {
    /// 连接浏览器失败（对整个运行是致命的）
    ConnectionFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// CDP 命令执行失败
    CommandFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::ConnectionFailed { endpoint, source } => {
                write!(f, "无法连接到浏览器 (端点: {}): {}", endpoint, source)
            }
            BrowserError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            BrowserError::NavigationFailed { url, source } => {
                write!(f, "导航到 {} 失败: {}", url, source)
            }
            BrowserError::CommandFailed { source } => {
                write!(f, "CDP 命令执行失败: {}", source)
            }
        }
    }
}

impl std::error::Error for BrowserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BrowserError::ConnectionFailed { source, .. }
            | BrowserError::PageCreationFailed { source }
            | BrowserError::NavigationFailed { source, .. }
            | BrowserError::CommandFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 单个任务的错误
///
/// 这些错误只影响当前任务，批处理会继续处理下一个条目
#[derive(Debug)]
pub enum JobError {
    /// 图片路径无效（在任何页面交互之前检查）
    InvalidImagePath {
        path: String,
    },
    /// 页面元素不存在（页面结构可能已变更）
    ElementNotFound {
        selector: String,
    },
    /// 等待图片上传完成超时
    UploadTimeout {
        seconds: u64,
    },
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::InvalidImagePath { path } => write!(f, "无效的图片路径: {}", path),
            JobError::ElementNotFound { selector } => {
                write!(f, "页面元素不存在: {}", selector)
            }
            JobError::UploadTimeout { seconds } => {
                write!(f, "等待图片上传完成超时 ({}秒)", seconds)
            }
        }
    }
}

impl std::error::Error for JobError {}

/// 准入控制错误
#[derive(Debug)]
pub enum AdmissionError {
    /// 等待队列空位超过总时限
    QueueWaitExceeded {
        seconds: u64,
    },
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionError::QueueWaitExceeded { seconds } => {
                write!(f, "等待队列空位超过 {} 秒，放弃本次运行", seconds)
            }
        }
    }
}

impl std::error::Error for AdmissionError {}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 读取失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 移动文件失败
    MoveFailed {
        from: String,
        to: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    DirectoryNotFound {
        path: String,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::MoveFailed { from, to, source } => {
                write!(f, "移动文件失败 ({} -> {}): {}", from, to, source)
            }
            FileError::DirectoryNotFound { path } => write!(f, "目录不存在: {}", path),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. } | FileError::MoveFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::CommandFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建浏览器连接错误
    pub fn connection_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建导航失败错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建页面创建失败错误
    pub fn page_creation_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Browser(BrowserError::PageCreationFailed {
            source: Box::new(source),
        })
    }

    /// 创建图片路径无效错误
    pub fn invalid_image_path(path: impl Into<String>) -> Self {
        AppError::Job(JobError::InvalidImagePath { path: path.into() })
    }

    /// 创建元素不存在错误
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        AppError::Job(JobError::ElementNotFound {
            selector: selector.into(),
        })
    }

    /// 创建上传超时错误
    pub fn upload_timeout(seconds: u64) -> Self {
        AppError::Job(JobError::UploadTimeout { seconds })
    }

    /// 创建队列等待超时错误
    pub fn queue_wait_exceeded(seconds: u64) -> Self {
        AppError::Admission(AdmissionError::QueueWaitExceeded { seconds })
    }

    /// 创建移动文件失败错误
    pub fn move_failed(
        from: impl Into<String>,
        to: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::MoveFailed {
            from: from.into(),
            to: to.into(),
            source: Box::new(source),
        })
    }

    /// 创建目录不存在错误
    pub fn directory_not_found(path: impl Into<String>) -> Self {
        AppError::File(FileError::DirectoryNotFound { path: path.into() })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
