//! デプロイパイプライン
//!
//! ステップは [`Step::sequence`] の順に 1 つずつ実行する。各ステップは自分のログだけを返し、
//! 蓄積は [`deploy`] が行う。最初の失敗でエラーエントリを 1 件追加して打ち切る。
//! 起動済みのサービスはそのまま残す（ロールバックしない）。

use crate::error::{DeployError, Result};
use crate::filler::{FillerLaunch, fill};
use crate::instructions::follow_up_instructions;
use crate::services::{STORAGE_INIT_COMMAND, SeededStore, descriptor_for};
use hobbitflow_container::{ContainerError, ContainerGateway, PollConfig, launch, run_after_ready};
use hobbitflow_core::platform::{NETWORKS, PlatformService};
use hobbitflow_core::{Answers, DeploySettings, LogEntry, ServiceHandle};
use serde_json::{Value, json};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// パイプラインの実行オプション
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// 設定バンドルのルートディレクトリ
    pub bundle_root: PathBuf,
    pub poll: PollConfig,
    pub sparql_username: String,
    pub sparql_password: String,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self::from_settings(&DeploySettings::default())
    }
}

impl DeployOptions {
    pub fn from_settings(settings: &DeploySettings) -> Self {
        Self {
            bundle_root: settings.bundle_root.clone(),
            poll: PollConfig::new(settings.poll_interval(), settings.poll_timeout()),
            sparql_username: settings.sparql_username.clone(),
            sparql_password: settings.sparql_password.clone(),
        }
    }
}

/// パイプラインの 1 ステップ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// 固定ネットワークの作成
    Networks,
    /// ボリューム作成 + フィラー実行
    Seed(PlatformService),
    Launch(PlatformService),
    /// トリプルストアの初期化コマンド
    Bootstrap,
}

impl Step {
    /// 実行順に並べた全ステップ
    pub fn sequence() -> Vec<Step> {
        let mut steps = vec![Step::Networks];
        for service in PlatformService::ALL {
            if SeededStore::for_service(service).is_some() {
                steps.push(Step::Seed(service));
            }
            steps.push(Step::Launch(service));
            if service == PlatformService::Virtuoso {
                steps.push(Step::Bootstrap);
            }
        }
        steps
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Networks => write!(f, "networks"),
            Step::Seed(service) => write!(f, "seed:{}", service.slug()),
            Step::Launch(service) => write!(f, "launch:{}", service.slug()),
            Step::Bootstrap => write!(f, "bootstrap:{}", PlatformService::Virtuoso.slug()),
        }
    }
}

/// ステップの実行結果
#[derive(Default)]
struct StepOutput {
    entries: Vec<LogEntry>,
    handle: Option<ServiceHandle>,
}

impl StepOutput {
    fn entry(entry: LogEntry) -> Self {
        Self {
            entries: vec![entry],
            handle: None,
        }
    }
}

struct Pipeline<'a> {
    gateway: &'a dyn ContainerGateway,
    answers: &'a Answers,
    owner: &'a str,
    options: &'a DeployOptions,
}

impl Pipeline<'_> {
    async fn run_step(&self, step: Step, triple_store: Option<&ServiceHandle>) -> Result<StepOutput> {
        match step {
            Step::Networks => self.ensure_networks().await,
            Step::Seed(service) => self.seed(service).await,
            Step::Launch(service) => self.launch(service).await,
            Step::Bootstrap => self.bootstrap(triple_store).await,
        }
    }

    async fn ensure_networks(&self) -> Result<StepOutput> {
        debug!("creating networks..");
        for network in NETWORKS {
            self.gateway
                .create_network(network)
                .await
                .map_err(|e| match e {
                    ContainerError::NetworkFailed { .. } => DeployError::from(e),
                    other => DeployError::Network {
                        network: network.to_string(),
                        message: other.to_string(),
                    },
                })?;
        }
        Ok(StepOutput::entry(
            LogEntry::info(format!("Networks ready: {}", NETWORKS.join(", ")))
                .with_data(json!(NETWORKS)),
        ))
    }

    async fn seed(&self, service: PlatformService) -> Result<StepOutput> {
        let Some(store) = SeededStore::for_service(service) else {
            return Ok(StepOutput::default());
        };

        let volume = self
            .gateway
            .create_volume(store.volume)
            .await
            .map_err(|e| match e {
                ContainerError::VolumeFailed { .. } => DeployError::from(e),
                other => DeployError::Volume {
                    volume: store.volume.to_string(),
                    message: other.to_string(),
                },
            })?;
        debug!("created volume {} ({})", volume.name, volume.id);
        let created = LogEntry::info(format!("Volume {} created", volume.name))
            .with_data(json!({"name": volume.name, "id": volume.id}));

        let params = FillerLaunch {
            project: self.answers.project_name.clone(),
            owner: self.owner.to_string(),
        };
        let bundle = self.options.bundle_root.join(store.bundle);
        let filler = fill(
            self.gateway,
            &bundle,
            store.tag,
            &volume,
            &params,
            &self.options.poll,
        )
        .await?;

        info!("HOBBIT {} config volume created", service.slug());
        Ok(StepOutput {
            entries: vec![
                created,
                LogEntry::info(format!(
                    "HOBBIT {} config volume filled by {}",
                    service.slug(),
                    filler.name
                )),
            ],
            handle: None,
        })
    }

    async fn launch(&self, service: PlatformService) -> Result<StepOutput> {
        let descriptor = descriptor_for(service, self.answers, self.owner, self.options);
        let handle = launch(self.gateway, &descriptor).await?;

        let data = json!({
            "backend": handle.backend().as_str(),
            "id": handle.id(),
            "name": handle.name(),
        });
        Ok(StepOutput {
            entries: vec![LogEntry::info(format!("Started {}", handle)).with_data(data)],
            handle: Some(handle),
        })
    }

    async fn bootstrap(&self, triple_store: Option<&ServiceHandle>) -> Result<StepOutput> {
        let Some(handle) = triple_store else {
            return Err(DeployError::ExecFailed {
                target: PlatformService::Virtuoso.hostname(&self.answers.project_name),
                message: "service has not been launched".to_string(),
            });
        };

        let command: Vec<String> = STORAGE_INIT_COMMAND.iter().map(|s| s.to_string()).collect();
        let output = run_after_ready(self.gateway, handle, &command, &self.options.poll).await?;
        debug!("storage init output: {}", output);

        Ok(StepOutput::entry(
            LogEntry::info(format!("Storage initialized in {}", handle.name()))
                .with_data(Value::String(output)),
        ))
    }
}

/// HOBBIT プラットフォームをデプロイする
///
/// 失敗しても `Err` は返さない。失敗はログ中の唯一の `error` エントリとして現れる。
/// 成功時はログの末尾に手動設定手順が並ぶ。
pub async fn deploy(
    gateway: &dyn ContainerGateway,
    answers: &Answers,
    owner: &str,
    options: &DeployOptions,
) -> Vec<LogEntry> {
    info!(
        "starting HOBBIT platform '{}' on {}",
        answers.project_name,
        gateway.backend()
    );

    let pipeline = Pipeline {
        gateway,
        answers,
        owner,
        options,
    };

    let mut log = Vec::new();
    let mut triple_store: Option<ServiceHandle> = None;

    for step in Step::sequence() {
        debug!("step {}", step);
        match pipeline.run_step(step, triple_store.as_ref()).await {
            Ok(output) => {
                log.extend(output.entries);
                if step == Step::Launch(PlatformService::Virtuoso) {
                    triple_store = output.handle;
                }
            }
            Err(err) => {
                error!("step {} failed: {}", step, err);
                log.push(LogEntry::error(err.to_string(), err.data(&step.to_string())));
                return log;
            }
        }
    }

    info!("HOBBIT platform '{}' deployed", answers.project_name);
    log.extend(
        follow_up_instructions(answers)
            .into_iter()
            .map(LogEntry::info),
    );
    log
}
