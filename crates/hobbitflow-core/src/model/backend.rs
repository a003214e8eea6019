//! バックエンドモード定義

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// コンテナエンジンのステータス／アドレッシングモデル
///
/// - `Swarm`: サービス／タスク抽象を持つクラスタモード
/// - `Single`: コンテナを直接扱う単一ホストモード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendMode {
    Swarm,
    Single,
}

impl BackendMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Swarm => "swarm",
            Self::Single => "single",
        }
    }

    pub fn is_clustered(&self) -> bool {
        matches!(self, Self::Swarm)
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swarm" | "cluster" | "clustered" => Ok(Self::Swarm),
            "single" | "single-host" | "standalone" => Ok(Self::Single),
            other => Err(CoreError::InvalidBackendMode(other.to_string())),
        }
    }
}
