//! デプロイログ

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Error,
}

/// パイプラインが呼び出し元へ返すログエントリ
///
/// 失敗はこのエントリ（`level: error`）としてのみ観測される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub level: LogLevel,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
            level: LogLevel::Info,
        }
    }

    pub fn error(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            level: LogLevel::Error,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_log_entry_serialization() {
        let entry = LogEntry::info("You are ready to go!");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value, json!({"message": "You are ready to go!", "level": "info"}));

        let err = LogEntry::error("boom", json!({"kind": "LaunchFailed"}));
        assert!(err.is_error());
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["level"], "error");
        assert_eq!(value["data"]["kind"], "LaunchFailed");
    }
}
