//! 対話入力（プロンプト）で収集される回答

use serde::{Deserialize, Serialize};

/// デプロイ前に収集されるユーザー回答
///
/// キー名は対話プロンプトの質問名と一致させる（`projectName`, `isTesting`, ...）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Answers {
    pub project_name: String,
    pub is_testing: bool,
    pub gitlab_user: String,
    pub gitlab_email: String,
    pub gitlab_token: String,
    /// GUI のドメイン
    pub gui_host: String,
    /// Keycloak のドメイン
    pub keycloak_host: String,
    /// Virtuoso のドメイン
    pub virtuoso_host: String,
    /// RabbitMQ 管理画面のドメイン
    pub rabbitmq_host: String,
}

impl Answers {
    /// 未入力の必須項目名を返す
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("projectName", &self.project_name),
            ("gitlabUser", &self.gitlab_user),
            ("gitlabEmail", &self.gitlab_email),
            ("gitlabToken", &self.gitlab_token),
            ("guiHost", &self.gui_host),
            ("keycloakHost", &self.keycloak_host),
            ("virtuosoHost", &self.virtuoso_host),
            ("rabbitmqHost", &self.rabbitmq_host),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// `DEPLOY_ENV` に渡す値
    pub fn deploy_env(&self) -> &'static str {
        if self.is_testing { "testing" } else { "production" }
    }
}
