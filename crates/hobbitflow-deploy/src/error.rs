use hobbitflow_container::ContainerError;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Error building volume filler image '{tag}': {message}")]
    BuildFailed { tag: String, message: String },

    #[error("Error creating config volume {volume}: {detail}")]
    FillFailed { volume: String, detail: String },

    #[error("Error starting {name}: {message}")]
    LaunchFailed { name: String, message: String },

    #[error("Error running command in {target}: {message}")]
    ExecFailed { target: String, message: String },

    #[error("Workload {name} failed: {detail}")]
    WorkloadFailed { name: String, detail: String },

    #[error("Timed out after {waited_secs}s waiting for {name}")]
    Timeout { name: String, waited_secs: u64 },

    #[error("Error creating network {network}: {message}")]
    Network { network: String, message: String },

    #[error("Error creating volume {volume}: {message}")]
    Volume { volume: String, message: String },

    #[error(transparent)]
    Container(ContainerError),
}

impl DeployError {
    /// エラー分類名
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BuildFailed { .. } => "BuildFailed",
            Self::FillFailed { .. } => "FillFailed",
            Self::LaunchFailed { .. } => "LaunchFailed",
            Self::ExecFailed { .. } => "ExecFailed",
            Self::WorkloadFailed { .. } => "WorkloadFailed",
            Self::Timeout { .. } => "Timeout",
            Self::Network { .. } => "NetworkFailed",
            Self::Volume { .. } => "VolumeFailed",
            Self::Container(_) => "ContainerError",
        }
    }

    /// エラーログエントリに載せる構造化データ
    pub fn data(&self, step: &str) -> Value {
        let detail = match self {
            Self::BuildFailed { tag, message } => json!({"tag": tag, "message": message}),
            Self::FillFailed { volume, detail } => json!({"volume": volume, "detail": detail}),
            Self::LaunchFailed { name, message } => json!({"name": name, "message": message}),
            Self::ExecFailed { target, message } => {
                json!({"target": target, "message": message})
            }
            Self::WorkloadFailed { name, detail } => json!({"name": name, "detail": detail}),
            Self::Timeout { name, waited_secs } => {
                json!({"name": name, "waitedSecs": waited_secs})
            }
            Self::Network { network, message } => {
                json!({"network": network, "message": message})
            }
            Self::Volume { volume, message } => json!({"volume": volume, "message": message}),
            Self::Container(err) => json!({"message": err.to_string()}),
        };
        json!({"kind": self.kind(), "step": step, "detail": detail})
    }
}

impl From<ContainerError> for DeployError {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::LaunchFailed { name, message } => Self::LaunchFailed { name, message },
            ContainerError::ExecFailed { target, message } => Self::ExecFailed { target, message },
            ContainerError::WorkloadFailed { name, detail } => Self::WorkloadFailed { name, detail },
            ContainerError::Timeout { name, waited_secs } => Self::Timeout { name, waited_secs },
            ContainerError::NetworkFailed { network, message } => {
                Self::Network { network, message }
            }
            ContainerError::VolumeFailed { volume, message } => Self::Volume { volume, message },
            other => Self::Container(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_errors_map_to_taxonomy() {
        let err: DeployError = ContainerError::Timeout {
            name: "hobbit-virtuoso-acme".to_string(),
            waited_secs: 600,
        }
        .into();
        assert_eq!(err.kind(), "Timeout");

        let err: DeployError = ContainerError::DockerApiError("boom".to_string()).into();
        assert_eq!(err.kind(), "ContainerError");
    }

    #[test]
    fn test_error_data_carries_step_and_detail() {
        let err = DeployError::FillFailed {
            volume: "hobbit-keycloak-config".to_string(),
            detail: "cp: can't create (code: 1)".to_string(),
        };
        let data = err.data("seed:keycloak");
        assert_eq!(data["kind"], "FillFailed");
        assert_eq!(data["step"], "seed:keycloak");
        assert_eq!(data["detail"]["detail"], "cp: can't create (code: 1)");
        assert_eq!(
            err.to_string(),
            "Error creating config volume hobbit-keycloak-config: cp: can't create (code: 1)"
        );
    }
}
