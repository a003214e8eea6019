//! レジストリ認証処理
//!
//! HOBBIT GitLab レジストリには回答で受け取ったトークンを使い、
//! それ以外のレジストリは Docker config.json の auths から認証情報を取得します。

use base64::Engine;
use bollard::auth::DockerCredentials;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Docker config.json の構造
#[derive(Debug, Deserialize)]
struct DockerConfig {
    #[serde(default)]
    auths: HashMap<String, AuthEntry>,
}

#[derive(Debug, Deserialize)]
struct AuthEntry {
    /// Base64エンコードされた "username:password"
    auth: Option<String>,
}

/// 明示的に与えられたログイン情報
#[derive(Debug, Clone)]
struct Login {
    registry: String,
    username: String,
    password: String,
    email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegistryAuth {
    config_path: PathBuf,
    logins: Vec<Login>,
}

impl Default for RegistryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryAuth {
    /// デフォルトで ~/.docker/config.json を使用
    pub fn new() -> Self {
        let config_path = std::env::var("DOCKER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|h| h.join(".docker"))
                    .unwrap_or_else(|| PathBuf::from(".docker"))
            })
            .join("config.json");

        Self {
            config_path,
            logins: Vec::new(),
        }
    }

    pub fn with_config_path(config_path: PathBuf) -> Self {
        Self {
            config_path,
            logins: Vec::new(),
        }
    }

    /// レジストリのログイン情報を追加（config.json より優先）
    pub fn with_login(
        mut self,
        registry: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        self.logins.push(Login {
            registry: registry.into(),
            username: username.into(),
            password: password.into(),
            email,
        });
        self
    }

    /// イメージ名から認証情報を取得（不要・未設定なら `None`）
    pub fn credentials_for(&self, image: &str) -> Option<DockerCredentials> {
        let registry = extract_registry(image)?;

        if let Some(login) = self.logins.iter().find(|l| l.registry == registry) {
            tracing::debug!("Using configured login for {}", registry);
            return Some(DockerCredentials {
                username: Some(login.username.clone()),
                password: Some(login.password.clone()),
                email: login.email.clone(),
                serveraddress: Some(registry.to_string()),
                ..Default::default()
            });
        }

        self.from_docker_config(registry)
    }

    fn from_docker_config(&self, registry: &str) -> Option<DockerCredentials> {
        let content = std::fs::read_to_string(&self.config_path).ok()?;
        let config: DockerConfig = serde_json::from_str(&content).ok()?;
        let auth_b64 = config.auths.get(registry)?.auth.as_deref()?;

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(auth_b64)
            .ok()?;
        let auth_str = String::from_utf8(decoded).ok()?;
        let (username, password) = auth_str.split_once(':')?;

        tracing::debug!("Found credentials in docker config for {}", registry);
        Some(DockerCredentials {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            serveraddress: Some(registry.to_string()),
            ..Default::default()
        })
    }
}

/// イメージ名からレジストリを抽出
///
/// 最初の `/` の前が `.` か `:` を含む場合だけレジストリとみなす
/// （例: `git.project-hobbit.eu:4567`, `localhost:5000`）。
pub fn extract_registry(image: &str) -> Option<&str> {
    let (first, _) = image.split_once('/')?;
    if first.contains('.') || first.contains(':') || first == "localhost" {
        Some(first)
    } else {
        None
    }
}
