//! ワークロードのステータスモデル
//!
//! クラスタモード（タスク）と単一ホストモード（コンテナ）では状態モデルが構造的に異なる。
//! 両者をタグ付きユニオンで表現し、[`WorkloadStatus::normalize`] で
//! `{terminal, success, detail}` に正規化する。分岐はここだけに閉じ込める。

use serde::{Deserialize, Serialize};
use std::fmt;

/// ワンショットのタスクが正常終了したときにエンジンが返すメッセージ
pub const COMPLETION_MARKER: &str = "finished";

/// Swarm タスクのライフサイクル状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Pending,
    Assigned,
    Running,
    Complete,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 単一ホストのコンテナ状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Exited,
}

impl ContainerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Exited => "exited",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    pub state: ContainerState,
    #[serde(default)]
    pub exit_code: i64,
    #[serde(default)]
    pub error: Option<String>,
}

/// バックエンドから取得したワークロードのステータス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum WorkloadStatus {
    Task(TaskStatus),
    Container(ContainerStatus),
}

/// ポーリングの終了条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTarget {
    /// ワンショットの完了を待つ
    Completion,
    /// 常駐ワークロードの起動を待つ
    Running,
}

/// 正規化されたステータス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub terminal: bool,
    pub success: bool,
    pub detail: String,
}

impl Normalized {
    fn pending(detail: String) -> Self {
        Self {
            terminal: false,
            success: false,
            detail,
        }
    }

    fn done(success: bool, detail: String) -> Self {
        Self {
            terminal: true,
            success,
            detail,
        }
    }
}

impl WorkloadStatus {
    pub fn normalize(&self, target: PollTarget) -> Normalized {
        match self {
            Self::Task(task) => {
                let detail = task.detail();
                match (target, task.state) {
                    (PollTarget::Completion, TaskState::Complete) => Normalized::done(
                        task.message.as_deref() == Some(COMPLETION_MARKER),
                        detail,
                    ),
                    (PollTarget::Running, TaskState::Running) => Normalized::done(true, detail),
                    (PollTarget::Running, TaskState::Complete) | (_, TaskState::Failed) => {
                        Normalized::done(false, detail)
                    }
                    _ => Normalized::pending(detail),
                }
            }
            Self::Container(container) => {
                let detail = container.detail();
                match (target, container.state) {
                    (PollTarget::Completion, ContainerState::Exited) => {
                        Normalized::done(container.exit_code == 0, detail)
                    }
                    (PollTarget::Running, ContainerState::Running) => {
                        Normalized::done(true, detail)
                    }
                    (PollTarget::Running, ContainerState::Exited) => {
                        Normalized::done(false, detail)
                    }
                    _ => Normalized::pending(detail),
                }
            }
        }
    }
}

impl TaskStatus {
    fn detail(&self) -> String {
        let message = self
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(self.state.as_str());
        match self.error.as_deref().filter(|e| !e.is_empty()) {
            Some(err) => format!("{}: {}", message, err),
            None => message.to_string(),
        }
    }
}

impl ContainerStatus {
    fn detail(&self) -> String {
        let error = self
            .error
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(self.state.as_str());
        format!("{} (code: {})", error, self.exit_code)
    }
}
