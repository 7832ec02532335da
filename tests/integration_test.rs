use hailuo_video_submit::config::Config;
use hailuo_video_submit::infrastructure::PageOps;
use hailuo_video_submit::models::JobRequest;
use hailuo_video_submit::services::AdmissionController;
use hailuo_video_submit::session::Session;
use hailuo_video_submit::utils::logging;
use hailuo_video_submit::workflow::{JobCtx, SubmitFlow};
use std::path::PathBuf;
use std::time::Duration;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_session_open_and_close() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 建立会话
    let mut session = Session::open(&config).await.expect("建立会话失败");

    // 关闭是幂等的，重复调用必须安全
    session.close().await;
    session.close().await;
}

#[tokio::test]
#[ignore]
async fn test_check_quota_on_live_page() {
    logging::init();

    let config = Config::from_env();

    let mut session = Session::open(&config).await.expect("建立会话失败");
    session
        .navigate(&config.base_url, Duration::from_secs(config.page_timeout_secs))
        .await
        .expect("导航失败");

    let ops = PageOps::new(
        session.page().expect("页面不可用").clone(),
        Duration::from_secs(config.element_wait_secs),
    );
    let admission = AdmissionController::new(&config);

    let quota_ok = admission.check_quota(&ops).await;
    println!("额度检查结果: {}", quota_ok);

    let has_room = admission.check_queue_status(&ops).await;
    println!("队列空位检查结果: {}", has_room);

    session.close().await;
}

#[tokio::test]
#[ignore]
async fn test_submit_single_image() {
    logging::init();

    let config = Config::from_env();

    let mut session = Session::open(&config).await.expect("建立会话失败");
    session
        .navigate(&config.base_url, Duration::from_secs(config.page_timeout_secs))
        .await
        .expect("导航失败");

    let ops = PageOps::new(
        session.page().expect("页面不可用").clone(),
        Duration::from_secs(config.element_wait_secs),
    );
    let flow = SubmitFlow::new(&config, session.signal());

    // 注意：请根据实际情况修改文件路径
    let image_path = PathBuf::from("output/sample.png");
    let request = JobRequest::new(config.prompt.clone(), Some(image_path));
    let ctx = JobCtx::new(1, "sample.png");

    let outcome = flow.run(&ops, &request, &ctx).await.expect("提交流程失败");
    println!("提交结果: {:?}", outcome);

    session.close().await;
}
