//! コンテナエンジンへのゲートウェイ
//!
//! パイプラインはエンジンを直接触らず、このトレイト越しに操作する。
//! 本番は [`crate::DockerGateway`]、テストは記録用のモックが実装する。

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use hobbitflow_build::BuiltImage;
use hobbitflow_core::{BackendMode, ServiceHandle, VolumeRef, WorkloadDescriptor, WorkloadStatus};

/// exec の出力ストリーム（エンジンの多重化フレームのまま）
pub type OutputStream = BoxStream<'static, Result<Bytes>>;

/// ワークロードのステータス取得元
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn workload_status(&self, handle: &ServiceHandle) -> Result<WorkloadStatus>;
}

#[async_trait]
pub trait ContainerGateway: StatusSource {
    fn backend(&self) -> BackendMode;

    /// ネットワークを作成する（既に存在する場合も成功）
    async fn create_network(&self, name: &str) -> Result<()>;

    async fn create_volume(&self, name: &str) -> Result<VolumeRef>;

    async fn build_image(
        &self,
        context: Vec<u8>,
        tag: &str,
        log_line: &(dyn for<'a> Fn(&'a str) + Send + Sync),
    ) -> Result<BuiltImage>;

    async fn start_workload(&self, descriptor: &WorkloadDescriptor) -> Result<ServiceHandle>;

    /// exec を発行できるコンテナIDを解決する
    async fn exec_target(&self, handle: &ServiceHandle) -> Result<String>;

    async fn exec(&self, target: &str, command: &[String]) -> Result<OutputStream>;
}
