use anyhow::Result;
use hailuo_video_submit::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    hailuo_video_submit::utils::logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
