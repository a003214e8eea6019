// Bollard 0.19 の非推奨APIを一時的に使用
#![allow(deprecated)]

use crate::error::{BuildError, Result};
use bollard::Docker;
use bollard::image::BuildImageOptions;
use futures_util::stream::StreamExt;

/// ビルド結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltImage {
    /// エンジンが報告したイメージID（報告がなければタグ）
    pub image: String,
    /// ビルドログ（行単位）
    pub log: Vec<String>,
}

pub struct ImageBuilder {
    docker: Docker,
}

impl ImageBuilder {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// イメージをビルド
    ///
    /// ビルドログは1行ずつ `log_line` に渡される。
    pub async fn build_image(
        &self,
        context_data: Vec<u8>,
        tag: &str,
        log_line: &(dyn Fn(&str) + Send + Sync),
    ) -> Result<BuiltImage> {
        tracing::info!("Building image: {}", tag);

        let options = BuildImageOptions {
            dockerfile: "Dockerfile",
            t: tag,
            rm: true,      // 中間コンテナを削除
            forcerm: true, // ビルド失敗時も中間コンテナを削除
            ..Default::default()
        };

        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        let mut log = Vec::new();
        let mut image_id = None;

        while let Some(msg) = stream.next().await {
            let output = msg.map_err(BuildError::DockerConnection)?;
            if let Some(id) = handle_build_output(output, &mut log, log_line)? {
                image_id = Some(id);
            }
        }

        let image = image_id.unwrap_or_else(|| tag.to_string());
        tracing::info!("Successfully built: {} ({})", tag, image);
        Ok(BuiltImage { image, log })
    }
}

/// ビルド出力の処理
///
/// ログ行を蓄積し、イメージIDが報告されればそれを返す。
fn handle_build_output(
    output: bollard::models::BuildInfo,
    log: &mut Vec<String>,
    log_line: &(dyn Fn(&str) + Send + Sync),
) -> Result<Option<String>> {
    if let Some(error) = output.error {
        return Err(BuildError::BuildFailed(error));
    }

    if let Some(error_detail) = output.error_detail {
        let error_msg = error_detail
            .message
            .unwrap_or_else(|| "Unknown build error".to_string());
        return Err(BuildError::BuildFailed(error_msg));
    }

    for text in [output.stream, output.status].into_iter().flatten() {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            log_line(line);
            log.push(line.to_string());
        }
    }

    Ok(output.aux.and_then(|aux| aux.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn collect() -> (Mutex<Vec<String>>, Vec<String>) {
        (Mutex::new(Vec::new()), Vec::new())
    }

    #[test]
    fn test_handle_build_output_forwards_lines() {
        let (seen, mut log) = collect();
        let sink = |line: &str| seen.lock().unwrap().push(line.to_string());

        let output = bollard::models::BuildInfo {
            stream: Some("Step 1/3 : FROM busybox\n\n".to_string()),
            ..Default::default()
        };
        let id = handle_build_output(output, &mut log, &sink).unwrap();

        assert_eq!(id, None);
        assert_eq!(log, vec!["Step 1/3 : FROM busybox".to_string()]);
        assert_eq!(*seen.lock().unwrap(), log);
    }

    #[test]
    fn test_handle_build_output_reports_image_id() {
        let (_, mut log) = collect();
        let output = bollard::models::BuildInfo {
            aux: Some(bollard::models::ImageId {
                id: Some("sha256:0123456789abcdef".to_string()),
            }),
            ..Default::default()
        };
        let id = handle_build_output(output, &mut log, &|_| {}).unwrap();
        assert_eq!(id.as_deref(), Some("sha256:0123456789abcdef"));
    }

    #[test]
    fn test_handle_build_output_error() {
        let (_, mut log) = collect();
        let output = bollard::models::BuildInfo {
            error_detail: Some(bollard::models::ErrorDetail {
                message: Some("COPY failed: no such file".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = handle_build_output(output, &mut log, &|_| {}).unwrap_err();
        assert!(matches!(err, BuildError::BuildFailed(msg) if msg.contains("COPY failed")));
    }

    #[tokio::test]
    #[ignore] // Docker接続が必要なため、通常のテストではスキップ
    async fn test_build_filler_image() {
        use crate::context::ContextBuilder;
        use std::fs;
        use tempfile::tempdir;

        let docker = Docker::connect_with_local_defaults().unwrap();
        let builder = ImageBuilder::new(docker.clone());

        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join("Dockerfile"),
            "FROM busybox\nCOPY . /cfg\nCMD cp -r /cfg/. /cfg-volume/",
        )
        .unwrap();

        let context_data = ContextBuilder::create_context(temp_dir.path()).unwrap();
        let built = builder
            .build_image(context_data, "hobbitflow-test-filler", &|_| {})
            .await
            .unwrap();

        assert!(!built.image.is_empty());

        docker
            .remove_image(
                "hobbitflow-test-filler",
                None::<bollard::query_parameters::RemoveImageOptions>,
                None,
            )
            .await
            .ok();
    }
}
