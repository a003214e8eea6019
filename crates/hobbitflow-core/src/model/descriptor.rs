//! ワークロード記述子

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 再起動ポリシー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// 再起動しない（ワンショット用）
    #[default]
    Never,
    /// 常に再起動
    Always,
    /// 異常終了時のみ再起動
    OnFailure,
    /// 明示的に停止しない限り再起動
    UnlessStopped,
}

/// マウント種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountKind {
    Volume,
    Bind,
}

/// マウント定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountSpec {
    pub kind: MountKind,
    /// ボリューム名、またはホスト側パス
    pub source: String,
    /// コンテナ内パス
    pub target: String,
}

impl MountSpec {
    pub fn volume(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: MountKind::Volume,
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn bind(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: MountKind::Bind,
            source: source.into(),
            target: target.into(),
        }
    }
}

/// ランチャーに渡すワークロードの宣言的な定義
///
/// ランチャーへ渡した後は変更しない。環境変数は `KEY=value` 形式の文字列で保持し、
/// そのままエンジンへ渡す（キー名はサービスイメージとの互換性の一部）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadDescriptor {
    pub image: String,
    /// デプロイ名（コンテナ名／サービス名）
    pub name: String,
    pub project: String,
    /// 所有者（デプロイを実行したユーザー）
    pub owner: String,
    pub hostname: String,
    #[serde(default)]
    pub restart: RestartPolicy,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub mounts: Vec<MountSpec>,
    /// ルーティング等のラベル
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// 接続するネットワーク名（先頭がプライマリ）
    #[serde(default)]
    pub networks: Vec<String>,
    /// イメージの CMD を上書きする場合のみ指定
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

impl WorkloadDescriptor {
    pub fn new(
        image: impl Into<String>,
        name: impl Into<String>,
        project: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            image: image.into(),
            hostname: name.clone(),
            name,
            project: project.into(),
            owner: owner.into(),
            ..Default::default()
        }
    }

    pub fn restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.env.push(format!("{}={}", key, value.as_ref()));
        self
    }

    pub fn mount(mut self, mount: MountSpec) -> Self {
        self.mounts.push(mount);
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.networks.push(network.into());
        self
    }

    pub fn command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = Some(command.into_iter().map(Into::into).collect());
        self
    }

    /// 環境変数リストから値を引く
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env.iter().find_map(|entry| {
            entry
                .split_once('=')
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v)
        })
    }
}

/// 作成済みボリュームへの参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRef {
    pub name: String,
    /// バックエンドが割り当てた識別子（マウントポイント）
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults_hostname_to_name() {
        let d = WorkloadDescriptor::new("redis:4.0.7", "hobbit-redis-acme", "acme", "alice");
        assert_eq!(d.hostname, "hobbit-redis-acme");
        assert_eq!(d.restart, RestartPolicy::Never);
        assert!(d.command.is_none());
    }

    #[test]
    fn test_descriptor_env_lookup() {
        let d = WorkloadDescriptor::new("img", "n", "p", "o")
            .env("HOBBIT_RABBIT_HOST", "hobbit-rabbit-acme")
            .env("URL", "http://x/?a=b");

        assert_eq!(d.env_value("HOBBIT_RABBIT_HOST"), Some("hobbit-rabbit-acme"));
        // 値側の '=' はそのまま保持される
        assert_eq!(d.env_value("URL"), Some("http://x/?a=b"));
        assert_eq!(d.env_value("MISSING"), None);
        assert_eq!(d.env[0], "HOBBIT_RABBIT_HOST=hobbit-rabbit-acme");
    }

    #[test]
    fn test_mount_constructors() {
        let v = MountSpec::volume("hobbit-keycloak-config", "/cfg-volume");
        assert_eq!(v.kind, MountKind::Volume);
        let b = MountSpec::bind("/var/run/docker.sock", "/var/run/docker.sock");
        assert_eq!(b.kind, MountKind::Bind);
    }
}
