use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Dockerfile not found in bundle: {0}")]
    DockerfileNotFound(PathBuf),

    #[error("Bundle directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Docker connection error: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::DockerfileNotFound(path) => {
                format!(
                    "バンドルに Dockerfile がありません: {}\n\
                     \n\
                     フィラーイメージは各バンドル直下の Dockerfile からビルドされます。",
                    path.display()
                )
            }
            BuildError::ContextNotFound(path) => {
                format!(
                    "バンドルディレクトリが見つかりません: {}\n\
                     \n\
                     --bundles オプション、または settings.bundleRoot を確認してください。",
                    path.display()
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
pub type Result<T> = BuildResult<T>;
