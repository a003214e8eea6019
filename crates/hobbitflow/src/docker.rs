use colored::Colorize;
use hobbitflow_container::DockerGateway;
use hobbitflow_core::BackendMode;

fn print_connection_error(e: &dyn std::fmt::Display) {
    eprintln!();
    eprintln!("{}", "✗ Docker接続エラー".red().bold());
    eprintln!();
    eprintln!("{}", "原因:".yellow());
    eprintln!("  {}", e);
    eprintln!();
    eprintln!("{}", "解決方法:".yellow());
    eprintln!("  • Dockerが起動しているか確認してください");
    eprintln!("  • DOCKER_HOST が正しいエンジンを指しているか確認してください");
    eprintln!("  • docker ps コマンドが正常に動作するか確認してください");
}

pub async fn init_docker_with_error_handling() -> anyhow::Result<bollard::Docker> {
    match bollard::Docker::connect_with_local_defaults() {
        Ok(docker) => match docker.ping().await {
            Ok(_) => Ok(docker),
            Err(e) => {
                print_connection_error(&e);
                Err(anyhow::anyhow!("Docker接続に失敗しました"))
            }
        },
        Err(e) => {
            print_connection_error(&e);
            Err(anyhow::anyhow!("Docker接続に失敗しました"))
        }
    }
}

/// `--mode` の値からバックエンドを決める（auto はエンジンの Swarm 状態で判定）
pub async fn resolve_backend(docker: &bollard::Docker, mode: &str) -> anyhow::Result<BackendMode> {
    if mode.eq_ignore_ascii_case("auto") {
        let backend = DockerGateway::detect_backend(docker).await?;
        tracing::debug!("detected backend: {}", backend);
        return Ok(backend);
    }
    Ok(mode.parse()?)
}
