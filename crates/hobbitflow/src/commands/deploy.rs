use crate::docker;
use colored::Colorize;
use hobbitflow_config::HobbitConfig;
use hobbitflow_container::{DockerGateway, RegistryAuth};
use hobbitflow_core::platform::HOBBIT_REGISTRY;
use hobbitflow_core::{BackendMode, LogEntry, LogLevel};
use hobbitflow_deploy::DeployOptions;

pub async fn handle(
    config: &HobbitConfig,
    mode: &str,
    owner: &str,
    json: bool,
) -> anyhow::Result<()> {
    // 接続前に --mode の値を検証
    if !mode.eq_ignore_ascii_case("auto") {
        mode.parse::<BackendMode>()?;
    }

    let answers = &config.answers;
    if !json {
        println!(
            "{} {}",
            "HOBBIT プラットフォームをデプロイ中:".blue(),
            answers.project_name.cyan()
        );
    }

    let docker_conn = docker::init_docker_with_error_handling().await?;
    let backend = docker::resolve_backend(&docker_conn, mode).await?;
    if !json {
        println!("バックエンド: {}", backend.to_string().cyan());
        println!();
    }

    let auth = RegistryAuth::new().with_login(
        HOBBIT_REGISTRY,
        &answers.gitlab_user,
        &answers.gitlab_token,
        Some(answers.gitlab_email.clone()),
    );
    let gateway = DockerGateway::new(docker_conn, backend).with_auth(auth);
    let options = DeployOptions::from_settings(&config.settings);

    let log = hobbitflow_deploy::deploy(&gateway, answers, owner, &options).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        for entry in &log {
            print_entry(entry);
        }
    }

    if log.iter().any(LogEntry::is_error) {
        return Err(anyhow::anyhow!("デプロイに失敗しました"));
    }
    Ok(())
}

fn print_entry(entry: &LogEntry) {
    let time = chrono::Local::now().format("%H:%M:%S").to_string();
    match entry.level {
        LogLevel::Info => println!("{} {}", time.dimmed(), entry.message),
        LogLevel::Error => {
            println!("{} {} {}", time.dimmed(), "✗".red().bold(), entry.message.red());
            if let Some(data) = &entry.data
                && let Ok(pretty) = serde_json::to_string_pretty(data)
            {
                for line in pretty.lines() {
                    println!("    {}", line.dimmed());
                }
            }
        }
    }
}
