//! サービスハンドル

use super::backend::BackendMode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ランチャーが返す、起動済みワークロードへの参照
///
/// ポーラーとエグゼキューターはこのハンドルだけでワークロードを特定する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "kebab-case")]
pub enum ServiceHandle {
    /// Swarm サービス（タスクはサービス名で引く）
    Service { id: String, name: String },
    /// 単一ホストのコンテナ
    Container { id: String, name: String },
}

impl ServiceHandle {
    pub fn id(&self) -> &str {
        match self {
            Self::Service { id, .. } | Self::Container { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Service { name, .. } | Self::Container { name, .. } => name,
        }
    }

    pub fn backend(&self) -> BackendMode {
        match self {
            Self::Service { .. } => BackendMode::Swarm,
            Self::Container { .. } => BackendMode::Single,
        }
    }
}

impl fmt::Display for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.id().chars().take(12).collect();
        write!(f, "{} ({} {})", self.name(), self.backend(), short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_accessors() {
        let h = ServiceHandle::Container {
            id: "0123456789abcdef".to_string(),
            name: "hobbit-virtuoso-acme".to_string(),
        };
        assert_eq!(h.backend(), BackendMode::Single);
        assert_eq!(h.name(), "hobbit-virtuoso-acme");
        assert_eq!(h.to_string(), "hobbit-virtuoso-acme (single 0123456789ab)");
    }

    #[test]
    fn test_handle_display_short_id() {
        let h = ServiceHandle::Service {
            id: "abc".to_string(),
            name: "svc".to_string(),
        };
        assert_eq!(h.backend(), BackendMode::Swarm);
        assert_eq!(h.to_string(), "svc (swarm abc)");
    }
}
