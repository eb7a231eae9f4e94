use clap::Parser;
use prreview::args::{Args, Command};
use prreview::config::AppConfig;
use prreview::errors::AppError;
use prreview::server;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut config = AppConfig::load()?;

    match args.command {
        Command::Review {
            repo,
            pr,
            post,
            format,
            output,
        } => {
            println!("🚀 开始评审 {repo}#{pr}");
            let outcome = server::run_review(Arc::new(config), repo, pr, post).await?;

            let rendered = match format.as_str() {
                "json" => serde_json::to_string_pretty(&outcome.summary)
                    .map_err(|e| AppError::Generic(format!("序列化摘要失败: {e}")))?,
                _ => outcome.report.clone(),
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, &rendered)
                        .map_err(|e| AppError::IO(format!("writing report to {path}"), e))?;
                    println!("📝 报告已写入 {path}");
                }
                None => println!("{rendered}"),
            }

            println!(
                "✨ 评审完成：{} 个问题，得分 {:.1}/100，风险 {}",
                outcome.summary.total_issues,
                outcome.summary.quality_score,
                outcome.summary.risk_level.as_str()
            );
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            println!(
                "🚀 启动 webhook 服务器 {}:{}",
                config.server.host, config.server.port
            );
            server::serve(config).await?;
        }
    }

    Ok(())
}
