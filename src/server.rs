//! Webhook 服务器模块
//!
//! 提供三个 HTTP 端点：
//! - `GET /` 健康检查
//! - `POST /webhook/github` 接收 GitHub pull_request 事件，后台触发评审
//! - `POST /review` 手动触发一次评审并同步返回摘要

use bytes::Bytes;

use crate::config::AppConfig;
use crate::engine::ReviewEngine;
use crate::errors::AppError;
use crate::github::GitHubClient;
use crate::types::ReviewOutcome;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::Filter;

type HmacSha256 = Hmac<Sha256>;

/// 触发后台评审的 pull_request 动作
const REVIEW_ACTIONS: [&str; 3] = ["opened", "synchronize", "reopened"];

#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    action: String,
    number: u64,
    repository: RepositoryRef,
}

#[derive(Debug, Deserialize)]
struct RepositoryRef {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct ManualReviewRequest {
    repository: String,
    pr_number: u64,
    #[serde(default)]
    post: bool,
}

/// 拉取 PR 文件、执行评审，可选地把报告回帖到 PR
pub async fn run_review(
    config: Arc<AppConfig>,
    repository: String,
    pr_number: u64,
    post: bool,
) -> Result<ReviewOutcome, AppError> {
    let client = GitHubClient::new(&config.github)?;
    let files = client.fetch_pr_files(&repository, pr_number).await?;
    info!("📥 {repository}#{pr_number}: 拉取到 {} 个变更文件", files.len());

    // 诊断生产者走子进程，评审在阻塞线程上执行
    let engine_config = config.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let engine = ReviewEngine::new(&engine_config);
        engine.review(&files)
    })
    .await
    .map_err(|e| AppError::Analysis(format!("review task panicked: {e}")))?;

    if post {
        client
            .post_review_comment(&repository, pr_number, &outcome.report)
            .await?;
        info!("💬 报告已回帖到 {repository}#{pr_number}");
    }

    Ok(outcome)
}

/// 校验 GitHub webhook 的 HMAC-SHA256 签名（格式 `sha256=<hex>`）
fn verify_signature(secret: &str, body: &[u8], signature: Option<&str>) -> bool {
    let Some(signature) = signature else {
        return false;
    };
    let Some(hex_digest) = signature.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

async fn handle_health(config: Arc<AppConfig>) -> Result<impl warp::Reply, Infallible> {
    let response = serde_json::json!({
        "service": "prreview",
        "version": env!("CARGO_PKG_VERSION"),
        "webhook_configured": config.github.webhook_secret.is_some(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::OK,
    ))
}

async fn handle_webhook(
    signature: Option<String>,
    body: Bytes,
    config: Arc<AppConfig>,
) -> Result<impl warp::Reply, Infallible> {
    if let Some(secret) = &config.github.webhook_secret {
        if !verify_signature(secret, &body, signature.as_deref()) {
            warn!("🚫 webhook 签名校验失败");
            let response = serde_json::json!({ "error": "invalid signature" });
            return Ok(warp::reply::with_status(
                warp::reply::json(&response),
                StatusCode::UNAUTHORIZED,
            ));
        }
    }

    let event: PullRequestEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            let response = serde_json::json!({
                "error": format!("invalid payload: {e}")
            });
            return Ok(warp::reply::with_status(
                warp::reply::json(&response),
                StatusCode::BAD_REQUEST,
            ));
        }
    };

    if !REVIEW_ACTIONS.contains(&event.action.as_str()) {
        let response = serde_json::json!({
            "status": "ignored",
            "action": event.action,
        });
        return Ok(warp::reply::with_status(
            warp::reply::json(&response),
            StatusCode::OK,
        ));
    }

    info!(
        "🔔 webhook: {} {}#{}",
        event.action, event.repository.full_name, event.number
    );

    let repository = event.repository.full_name.clone();
    let pr_number = event.number;
    tokio::spawn(async move {
        match run_review(config, repository.clone(), pr_number, true).await {
            Ok(outcome) => info!(
                "✅ {repository}#{pr_number} 评审完成：{} 个问题，得分 {:.1}",
                outcome.summary.total_issues, outcome.summary.quality_score
            ),
            Err(e) => error!("❌ {repository}#{pr_number} 评审失败: {e}"),
        }
    });

    let response = serde_json::json!({
        "status": "accepted",
        "repository": event.repository.full_name,
        "pr_number": event.number,
    });
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::ACCEPTED,
    ))
}

async fn handle_manual_review(
    request: ManualReviewRequest,
    config: Arc<AppConfig>,
) -> Result<impl warp::Reply, Infallible> {
    match run_review(config, request.repository, request.pr_number, request.post).await {
        Ok(outcome) => Ok(warp::reply::with_status(
            warp::reply::json(&outcome.summary),
            StatusCode::OK,
        )),
        Err(e) => {
            error!("❌ 手动评审失败: {e}");
            let response = serde_json::json!({ "error": e.to_string() });
            Ok(warp::reply::with_status(
                warp::reply::json(&response),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

/// 启动 HTTP 服务器，阻塞直到进程退出
pub async fn serve(config: AppConfig) -> Result<(), AppError> {
    let addr: std::net::SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| AppError::Generic(format!("无效的监听地址: {e}")))?;

    if config.github.webhook_secret.is_none() {
        warn!("⚠️ 未配置 webhook 密钥，签名校验已关闭");
    }

    let config = Arc::new(config);
    let config_filter = warp::any().map(move || config.clone());

    let health_route = warp::path::end()
        .and(warp::get())
        .and(config_filter.clone())
        .and_then(handle_health);

    let webhook_route = warp::path("webhook")
        .and(warp::path("github"))
        .and(warp::post())
        .and(warp::header::optional::<String>("x-hub-signature-256"))
        .and(warp::body::bytes())
        .and(config_filter.clone())
        .and_then(handle_webhook);

    let review_route = warp::path("review")
        .and(warp::post())
        .and(warp::body::json())
        .and(config_filter.clone())
        .and_then(handle_manual_review);

    let routes = health_route.or(webhook_route).or(review_route);

    info!("🌐 服务器启动成功，监听 http://{addr}");
    warp::serve(routes).run(addr).await;

    Ok(())
}
