use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "回答ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: hobbit.local.yaml, .hobbit.local.yaml, hobbit.yaml, .hobbit.yaml\n\
        - ./.hobbitflow/ ディレクトリ\n\
        - ~/.config/hobbitflow/hobbit.yaml\n\
        または HOBBIT_ANSWERS_PATH 環境変数で直接指定できます"
    )]
    AnswersFileNotFound,

    #[error("必須の回答 '{0}' が未入力です")]
    MissingAnswer(&'static str),

    #[error("{key} の値が不正です: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("回答ファイルの解析に失敗しました ({path}): {message}")]
    Parse { path: PathBuf, message: String },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
