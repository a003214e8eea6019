mod commands;
mod docker;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hobbit")]
#[command(about = "HOBBIT ベンチマーキングプラットフォームをデプロイする", long_about = None)]
struct Cli {
    /// デバッグログを表示
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// プラットフォームをデプロイ
    Deploy {
        /// 回答ファイル（省略時は hobbit.yaml を探索）
        #[arg(short, long, env = "HOBBIT_ANSWERS_PATH")]
        answers: Option<PathBuf>,
        /// バックエンド (swarm, single, auto)
        #[arg(short, long, default_value = "auto")]
        mode: String,
        /// デプロイの所有者（ラベルに記録）
        #[arg(long, env = "HOBBIT_OWNER")]
        owner: Option<String>,
        /// 設定バンドルのルートディレクトリ
        #[arg(short, long)]
        bundles: Option<PathBuf>,
        /// ログを JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// 投入されるサービス記述子を表示（エンジンには接続しない）
    Plan {
        /// 回答ファイル（省略時は hobbit.yaml を探索）
        #[arg(short, long, env = "HOBBIT_ANSWERS_PATH")]
        answers: Option<PathBuf>,
        /// デプロイの所有者（ラベルに記録）
        #[arg(long, env = "HOBBIT_OWNER")]
        owner: Option<String>,
        /// 記述子を JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// バージョン情報を表示
    Version,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = if verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// 所有者名（未指定ならログインユーザー）
fn resolve_owner(owner: Option<String>) -> String {
    owner
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "hobbit".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Version => {
            println!("hobbitflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Plan {
            answers,
            owner,
            json,
        } => {
            let config = hobbitflow_config::load(answers.as_deref())?;
            commands::plan::handle(&config, &resolve_owner(owner), json)
        }
        Commands::Deploy {
            answers,
            mode,
            owner,
            bundles,
            json,
        } => {
            let mut config = hobbitflow_config::load(answers.as_deref())?;
            if let Some(bundles) = bundles {
                config.settings.bundle_root = bundles;
            }
            commands::deploy::handle(&config, &mode, &resolve_owner(owner), json).await
        }
    }
}
