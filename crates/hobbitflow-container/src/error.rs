use hobbitflow_build::BuildError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(
        "Dockerに接続できません: {0}\n\nヒント:\n  • Dockerが起動しているか確認してください\n  • Swarmモードの場合は docker info でノード状態を確認してください"
    )]
    DockerConnectionFailed(String),

    #[error("Docker APIエラー: {0}")]
    DockerApiError(String),

    #[error("network '{network}' could not be created: {message}")]
    NetworkFailed { network: String, message: String },

    #[error("volume '{volume}' could not be created: {message}")]
    VolumeFailed { volume: String, message: String },

    #[error("image '{image}' could not be pulled: {message}")]
    ImagePullFailed { image: String, message: String },

    #[error("failed to launch '{name}': {message}")]
    LaunchFailed { name: String, message: String },

    #[error("failed to run command in '{target}': {message}")]
    ExecFailed { target: String, message: String },

    #[error("workload '{name}' failed: {detail}")]
    WorkloadFailed { name: String, detail: String },

    #[error("timed out after {waited_secs}s waiting for '{name}'")]
    Timeout { name: String, waited_secs: u64 },

    #[error("workload '{name}' not found")]
    WorkloadNotFound { name: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl From<bollard::errors::Error> for ContainerError {
    fn from(err: bollard::errors::Error) -> Self {
        match &err {
            bollard::errors::Error::DockerResponseServerError { .. } => {
                // ステータスコード別の扱いは呼び出し側で行う
                ContainerError::DockerApiError(err.to_string())
            }
            _ => {
                // 接続エラーの可能性をチェック
                let err_str = err.to_string();
                if err_str.contains("Connection refused")
                    || err_str.contains("No such file or directory")
                {
                    ContainerError::DockerConnectionFailed(err_str)
                } else {
                    ContainerError::DockerApiError(err_str)
                }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ContainerError>;
