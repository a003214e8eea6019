//! 回答ファイル（hobbit.yaml）の探索と読み込み
//!
//! 回答はトップレベルに、デプロイ設定は `settings:` ブロックに書く。
//! 個々の回答は `HOBBIT_*` 環境変数で上書きできる。

pub mod error;

pub use error::*;

use hobbitflow_core::{Answers, DeploySettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ANSWERS_PATH_ENV: &str = "HOBBIT_ANSWERS_PATH";

const CANDIDATES: [&str; 4] = [
    "hobbit.local.yaml",
    ".hobbit.local.yaml",
    "hobbit.yaml",
    ".hobbit.yaml",
];

/// 回答ファイルの内容
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HobbitConfig {
    #[serde(flatten)]
    pub answers: Answers,
    #[serde(default)]
    pub settings: DeploySettings,
}

/// 回答ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 HOBBIT_ANSWERS_PATH (直接パス指定)
/// 2. カレントディレクトリ: hobbit.local.yaml, .hobbit.local.yaml, hobbit.yaml, .hobbit.yaml
/// 3. ./.hobbitflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/hobbitflow/hobbit.yaml (グローバル設定)
pub fn find_answers_file() -> Result<PathBuf> {
    if let Ok(answers_path) = std::env::var(ANSWERS_PATH_ENV) {
        let path = PathBuf::from(answers_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let hobbit_dir = current_dir.join(".hobbitflow");
    if hobbit_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = hobbit_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("hobbitflow").join("hobbit.yaml");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::AnswersFileNotFound)
}

/// 回答ファイルを読み込み、環境変数の上書きと必須項目の検証まで行う
///
/// `path` が `None` の場合は [`find_answers_file`] で探す。ファイルが無くても
/// 環境変数だけで必須項目が揃えば成功する。
pub fn load(path: Option<&Path>) -> Result<HobbitConfig> {
    let found = match path {
        Some(path) => Some(path.to_path_buf()),
        None => match find_answers_file() {
            Ok(path) => Some(path),
            Err(ConfigError::AnswersFileNotFound) => None,
            Err(e) => return Err(e),
        },
    };

    let mut config = match &found {
        Some(path) => parse_file(path)?,
        None => HobbitConfig::default(),
    };
    apply_env_overrides(&mut config.answers)?;

    match validate(&config.answers) {
        Err(ConfigError::MissingAnswer(_)) if found.is_none() => {
            return Err(ConfigError::AnswersFileNotFound);
        }
        result => result?,
    }
    validate_settings(&config.settings)?;

    Ok(config)
}

/// 回答ファイルを解析する（上書き・検証はしない）
pub fn parse_file(path: &Path) -> Result<HobbitConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, path)
}

fn parse_str(content: &str, path: &Path) -> Result<HobbitConfig> {
    if content.trim().is_empty() {
        return Ok(HobbitConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// `HOBBIT_*` 環境変数で回答を上書き
pub fn apply_env_overrides(answers: &mut Answers) -> Result<()> {
    let text_fields: [(&str, &mut String); 8] = [
        ("HOBBIT_PROJECT_NAME", &mut answers.project_name),
        ("HOBBIT_GITLAB_USER", &mut answers.gitlab_user),
        ("HOBBIT_GITLAB_EMAIL", &mut answers.gitlab_email),
        ("HOBBIT_GITLAB_TOKEN", &mut answers.gitlab_token),
        ("HOBBIT_GUI_HOST", &mut answers.gui_host),
        ("HOBBIT_KEYCLOAK_HOST", &mut answers.keycloak_host),
        ("HOBBIT_VIRTUOSO_HOST", &mut answers.virtuoso_host),
        ("HOBBIT_RABBITMQ_HOST", &mut answers.rabbitmq_host),
    ];
    for (key, field) in text_fields {
        if let Ok(value) = std::env::var(key) {
            *field = value;
        }
    }

    if let Ok(value) = std::env::var("HOBBIT_TESTING") {
        answers.is_testing = parse_flag(&value).ok_or(ConfigError::InvalidValue {
            key: "HOBBIT_TESTING",
            value,
        })?;
    }

    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" | "" => Some(false),
        _ => None,
    }
}

/// 必須の回答がすべて入力されているか確認
pub fn validate(answers: &Answers) -> Result<()> {
    match answers.missing_fields().first().copied() {
        Some(field) => Err(ConfigError::MissingAnswer(field)),
        None => Ok(()),
    }
}

/// デプロイ設定の値を確認
///
/// ポーリング間隔は 1 秒以上。タイムアウト 0 は無制限として許可する。
pub fn validate_settings(settings: &DeploySettings) -> Result<()> {
    if settings.poll_interval_secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "settings.pollIntervalSecs",
            value: settings.poll_interval_secs.to_string(),
        });
    }
    Ok(())
}
