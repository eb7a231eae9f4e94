use clap::Parser;

/// PRReview - PR 评审聚合与评分引擎
#[derive(Parser, Debug)]
#[command(name = "prreview")]
#[command(version)]
#[command(about = "拉取 PR 变更、聚合诊断、计算质量评分并生成评审报告")]
pub struct Args {
    /// 子命令
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub enum Command {
    /// 评审一个 pull request
    Review {
        /// 仓库，形如 owner/repo
        #[arg(long)]
        repo: String,
        /// PR 编号
        #[arg(long)]
        pr: u64,
        /// 把报告作为评论回帖到 PR
        #[arg(long)]
        post: bool,
        /// 输出格式（text 或 json）
        #[arg(long, default_value = "text")]
        format: String,
        /// 输出文件（默认打印到标准输出）
        #[arg(long)]
        output: Option<String>,
    },
    /// 启动 webhook 服务器
    Serve {
        /// 监听地址（覆盖配置文件）
        #[arg(long)]
        host: Option<String>,
        /// 监听端口（覆盖配置文件）
        #[arg(long)]
        port: Option<u16>,
    },
}
