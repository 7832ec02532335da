/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端点（已登录的浏览器实例）
    pub browser_endpoint: String,
    /// 目标站点 URL
    pub base_url: String,
    /// 待处理图片所在目录
    pub image_folder: String,
    /// 视频生成提示词
    pub prompt: String,
    /// 连接浏览器的网络超时（秒）
    pub connect_timeout_secs: u64,
    /// 页面级长等待上限（导航、图片上传）（秒）
    pub page_timeout_secs: u64,
    /// 单个视频生成任务的完成超时（秒）
    pub video_timeout_secs: u64,
    /// 固定轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 上传完成后的固定安定延迟（秒）
    pub settle_delay_secs: u64,
    /// 查找页面元素的有界等待（秒）
    pub element_wait_secs: u64,
    /// 等待队列空位的总时限（秒）
    pub queue_wait_timeout_secs: u64,
    /// 额度下限（剩余额度必须大于该值才允许提交）
    pub quota_floor: i64,
    /// 队列拥塞判定阈值（三类状态短语的合计出现次数）
    pub queue_busy_threshold: usize,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_endpoint: "http://localhost:9222".to_string(),
            base_url: "https://hailuoai.video/".to_string(),
            image_folder: "output".to_string(),
            prompt: "街道上, 小女孩在走秀的场景, 镜头保持跟拍小女孩走秀的过程, 小女孩走秀的感觉就像一个专业的模特."
                .to_string(),
            connect_timeout_secs: 30,
            page_timeout_secs: 36000,
            video_timeout_secs: 300,
            poll_interval_secs: 2,
            settle_delay_secs: 2,
            element_wait_secs: 30,
            queue_wait_timeout_secs: 3600,
            quota_floor: 30,
            queue_busy_threshold: 3,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_endpoint: std::env::var("BROWSER_ENDPOINT").unwrap_or(default.browser_endpoint),
            base_url: std::env::var("BASE_URL").unwrap_or(default.base_url),
            image_folder: std::env::var("IMAGE_FOLDER").unwrap_or(default.image_folder),
            prompt: std::env::var("VIDEO_PROMPT").unwrap_or(default.prompt),
            connect_timeout_secs: std::env::var("CONNECT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.connect_timeout_secs),
            page_timeout_secs: std::env::var("PAGE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.page_timeout_secs),
            video_timeout_secs: std::env::var("VIDEO_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.video_timeout_secs),
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_secs),
            settle_delay_secs: std::env::var("SETTLE_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_delay_secs),
            element_wait_secs: std::env::var("ELEMENT_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.element_wait_secs),
            queue_wait_timeout_secs: std::env::var("QUEUE_WAIT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.queue_wait_timeout_secs),
            quota_floor: std::env::var("QUOTA_FLOOR").ok().and_then(|v| v.parse().ok()).unwrap_or(default.quota_floor),
            queue_busy_threshold: std::env::var("QUEUE_BUSY_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(default.queue_busy_threshold),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }
}
