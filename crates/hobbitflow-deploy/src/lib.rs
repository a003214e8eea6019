//! HOBBIT プラットフォームのデプロイパイプライン
//!
//! ネットワーク作成 → 設定ボリュームの充填 → 各サービスの起動 → トリプルストアの初期化、
//! を固定順に 1 回だけ実行し、結果を [`hobbitflow_core::LogEntry`] の列として返します。

pub mod error;
pub mod filler;
pub mod instructions;
pub mod pipeline;
pub mod services;

pub use error::{DeployError, Result};
pub use filler::{FillerLaunch, fill};
pub use instructions::{READY_MESSAGE, follow_up_instructions};
pub use pipeline::{DeployOptions, Step, deploy};
pub use services::{
    SEEDED_STORES, STORAGE_INIT_COMMAND, SeededStore, descriptor_for, plan_descriptors,
};
