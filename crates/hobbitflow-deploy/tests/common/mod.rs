use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use hobbitflow_build::BuiltImage;
use hobbitflow_container::{
    ContainerError, ContainerGateway, OutputStream, PollConfig, Result, StatusSource,
    encode_frame,
};
use hobbitflow_core::{
    Answers, BackendMode, ContainerState, ContainerStatus, ServiceHandle, TaskState, TaskStatus,
    VolumeRef, WorkloadDescriptor, WorkloadStatus,
};
use hobbitflow_deploy::DeployOptions;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tempfile::TempDir;

pub const BOOTSTRAP_OUTPUT: &str = "Storage initialized\n";

/// 記録された 1 回のゲートウェイ呼び出し
#[derive(Debug, Clone)]
pub struct Call {
    pub op: &'static str,
    pub arg: String,
    pub started: Instant,
    pub ended: Instant,
}

/// 呼び出しを記録し、指定された箇所で失敗するゲートウェイ
pub struct RecordingGateway {
    backend: BackendMode,
    calls: Mutex<Vec<Call>>,
    launched: Mutex<Vec<WorkloadDescriptor>>,
    networks: Mutex<HashSet<String>>,
    reused_networks: Mutex<Vec<String>>,
    fail_on: Option<(&'static str, String)>,
    failing_fillers: HashSet<String>,
    stalled: HashSet<String>,
}

impl RecordingGateway {
    pub fn new(backend: BackendMode) -> Self {
        Self {
            backend,
            calls: Mutex::new(Vec::new()),
            launched: Mutex::new(Vec::new()),
            networks: Mutex::new(HashSet::new()),
            reused_networks: Mutex::new(Vec::new()),
            fail_on: None,
            failing_fillers: HashSet::new(),
            stalled: HashSet::new(),
        }
    }

    /// `op` の引数が `arg` に一致する呼び出しで失敗させる
    pub fn fail_on(mut self, op: &'static str, arg: &str) -> Self {
        self.fail_on = Some((op, arg.to_string()));
        self
    }

    /// 指定タグのフィラーを非成功で終了させる
    pub fn failing_filler(mut self, tag: &str) -> Self {
        self.failing_fillers.insert(tag.to_string());
        self
    }

    /// 指定ワークロードを終端状態にしない
    pub fn stall(mut self, name: &str) -> Self {
        self.stalled.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// ステータス問い合わせを除いた操作列（"op arg"）
    pub fn operations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.op != "workload_status")
            .map(|c| format!("{} {}", c.op, c.arg))
            .collect()
    }

    pub fn launched(&self) -> Vec<WorkloadDescriptor> {
        self.launched.lock().unwrap().clone()
    }

    /// 既存ネットワークとして扱った名前（呼び出し順）
    pub fn reused_networks(&self) -> Vec<String> {
        self.reused_networks.lock().unwrap().clone()
    }

    fn record<T>(&self, op: &'static str, arg: &str, started: Instant, result: Result<T>) -> Result<T> {
        self.calls.lock().unwrap().push(Call {
            op,
            arg: arg.to_string(),
            started,
            ended: Instant::now(),
        });
        result
    }

    fn should_fail(&self, op: &str, arg: &str) -> bool {
        matches!(&self.fail_on, Some((o, a)) if *o == op && a == arg)
    }

    fn is_filler(name: &str) -> bool {
        name.ends_with("-volume-filler")
    }
}

#[async_trait]
impl StatusSource for RecordingGateway {
    async fn workload_status(&self, handle: &ServiceHandle) -> Result<WorkloadStatus> {
        let started = Instant::now();
        let name = handle.name();
        let stalled = self.stalled.contains(name);
        let failing = self.failing_fillers.contains(name);

        let status = match (self.backend, Self::is_filler(name)) {
            (_, _) if stalled => match self.backend {
                BackendMode::Swarm => WorkloadStatus::Task(TaskStatus {
                    state: TaskState::Pending,
                    message: Some("pending".to_string()),
                    error: None,
                }),
                BackendMode::Single => WorkloadStatus::Container(ContainerStatus {
                    state: ContainerState::Created,
                    exit_code: 0,
                    error: None,
                }),
            },
            (BackendMode::Swarm, true) => WorkloadStatus::Task(TaskStatus {
                state: TaskState::Complete,
                message: Some(if failing { "exit status 1" } else { "finished" }.to_string()),
                error: None,
            }),
            (BackendMode::Swarm, false) => WorkloadStatus::Task(TaskStatus {
                state: TaskState::Running,
                message: Some("started".to_string()),
                error: None,
            }),
            (BackendMode::Single, true) => WorkloadStatus::Container(ContainerStatus {
                state: ContainerState::Exited,
                exit_code: if failing { 1 } else { 0 },
                error: failing.then(|| "cp: cannot create /cfg-volume".to_string()),
            }),
            (BackendMode::Single, false) => WorkloadStatus::Container(ContainerStatus {
                state: ContainerState::Running,
                exit_code: 0,
                error: None,
            }),
        };

        self.record("workload_status", name, started, Ok(status))
    }
}

#[async_trait]
impl ContainerGateway for RecordingGateway {
    fn backend(&self) -> BackendMode {
        self.backend
    }

    async fn create_network(&self, name: &str) -> Result<()> {
        let started = Instant::now();
        let result = if self.should_fail("create_network", name) {
            Err(ContainerError::NetworkFailed {
                network: name.to_string(),
                message: "permission denied".to_string(),
            })
        } else {
            // 既存の名前はエンジンと同じく成功扱い
            if !self.networks.lock().unwrap().insert(name.to_string()) {
                self.reused_networks.lock().unwrap().push(name.to_string());
            }
            Ok(())
        };
        self.record("create_network", name, started, result)
    }

    async fn create_volume(&self, name: &str) -> Result<VolumeRef> {
        let started = Instant::now();
        let result = if self.should_fail("create_volume", name) {
            Err(ContainerError::VolumeFailed {
                volume: name.to_string(),
                message: "volume already exists".to_string(),
            })
        } else {
            Ok(VolumeRef {
                name: name.to_string(),
                id: format!("/var/lib/docker/volumes/{}/_data", name),
            })
        };
        self.record("create_volume", name, started, result)
    }

    async fn build_image(
        &self,
        context: Vec<u8>,
        tag: &str,
        log_line: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> Result<BuiltImage> {
        let started = Instant::now();
        let result = if self.should_fail("build_image", tag) || context.is_empty() {
            Err(ContainerError::DockerApiError("COPY failed".to_string()))
        } else {
            let line = format!("Successfully tagged {}:latest", tag);
            log_line(&line);
            Ok(BuiltImage {
                image: tag.to_string(),
                log: vec![line],
            })
        };
        self.record("build_image", tag, started, result)
    }

    async fn start_workload(&self, descriptor: &WorkloadDescriptor) -> Result<ServiceHandle> {
        let started = Instant::now();
        let name = descriptor.name.clone();
        let result = if self.should_fail("start_workload", &name) {
            Err(ContainerError::DockerApiError(format!(
                "No such image: {}",
                descriptor.image
            )))
        } else {
            let mut launched = self.launched.lock().unwrap();
            launched.push(descriptor.clone());
            let id = format!("{:064x}", launched.len());
            Ok(match self.backend {
                BackendMode::Swarm => ServiceHandle::Service {
                    id,
                    name: name.clone(),
                },
                BackendMode::Single => ServiceHandle::Container {
                    id,
                    name: name.clone(),
                },
            })
        };
        self.record("start_workload", &name, started, result)
    }

    async fn exec_target(&self, handle: &ServiceHandle) -> Result<String> {
        let started = Instant::now();
        let target = match handle {
            ServiceHandle::Service { name, .. } => format!("{}.1.task", name),
            ServiceHandle::Container { id, .. } => id.clone(),
        };
        self.record("exec_target", handle.name(), started, Ok(target))
    }

    async fn exec(&self, target: &str, command: &[String]) -> Result<OutputStream> {
        let started = Instant::now();
        let result = if self.should_fail("exec", target) {
            Err(ContainerError::DockerApiError("container is not running".to_string()))
        } else {
            let frames: Vec<Result<bytes::Bytes>> = vec![
                Ok(encode_frame(1, b"Storage ")),
                Ok(encode_frame(1, b"initialized\n")),
            ];
            Ok(stream::iter(frames).boxed())
        };
        self.record("exec", &command.join(" "), started, result)
    }
}

pub fn answers() -> Answers {
    Answers {
        project_name: "acme".to_string(),
        is_testing: false,
        gitlab_user: "alice".to_string(),
        gitlab_email: "alice@example.org".to_string(),
        gitlab_token: "glpat-123".to_string(),
        gui_host: "gui.acme.io".to_string(),
        keycloak_host: "keycloak.acme.io".to_string(),
        virtuoso_host: "vos.acme.io".to_string(),
        rabbitmq_host: "rabbit.acme.io".to_string(),
    }
}

/// keycloak/, virtuoso/, redis/ の各バンドルを持つ一時ディレクトリ
pub struct Bundles {
    pub root: TempDir,
}

impl Bundles {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        for bundle in ["keycloak", "virtuoso", "redis"] {
            let dir = root.path().join(bundle);
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join("Dockerfile"),
                "FROM busybox\nCOPY . /cfg\nCMD cp -r /cfg/. /cfg-volume/\n",
            )
            .unwrap();
            fs::write(dir.join("config.txt"), bundle).unwrap();
        }
        Self { root }
    }

    #[allow(dead_code)]
    pub fn remove_dockerfile(&self, bundle: &str) {
        fs::remove_file(self.root.path().join(bundle).join("Dockerfile")).unwrap();
    }

    pub fn path(&self) -> PathBuf {
        self.root.path().to_path_buf()
    }

    pub fn options(&self) -> DeployOptions {
        DeployOptions {
            bundle_root: self.path(),
            poll: PollConfig::new(Duration::from_millis(1), Some(Duration::from_secs(5))),
            ..Default::default()
        }
    }
}
