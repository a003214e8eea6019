//! デプロイ設定

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 回答ファイルの `settings:` ブロック
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploySettings {
    /// 設定バンドル（keycloak/, virtuoso/, redis/）の置き場所
    pub bundle_root: PathBuf,
    pub poll_interval_secs: u64,
    /// 0 の場合は無制限
    pub poll_timeout_secs: u64,
    pub sparql_username: String,
    pub sparql_password: String,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            bundle_root: PathBuf::from("bundles"),
            poll_interval_secs: 3,
            poll_timeout_secs: 600,
            sparql_username: "HobbitPlatform".to_string(),
            sparql_password: "Password".to_string(),
        }
    }
}

impl DeploySettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        (self.poll_timeout_secs > 0).then(|| Duration::from_secs(self.poll_timeout_secs))
    }
}
