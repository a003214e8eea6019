use crate::error::{BuildError, BuildResult};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::Path;
use tar::Builder;

pub struct ContextBuilder;

impl ContextBuilder {
    /// バンドルディレクトリをビルドコンテキスト（tar.gz）にまとめる
    ///
    /// バンドル直下に Dockerfile が必要。
    pub fn create_context(bundle_path: &Path) -> BuildResult<Vec<u8>> {
        if !bundle_path.is_dir() {
            return Err(BuildError::ContextNotFound(bundle_path.to_path_buf()));
        }
        let dockerfile = bundle_path.join("Dockerfile");
        if !dockerfile.is_file() {
            return Err(BuildError::DockerfileNotFound(dockerfile));
        }

        tracing::debug!("Creating build context from: {}", bundle_path.display());

        let mut archive_data = Vec::new();
        {
            let encoder = GzEncoder::new(&mut archive_data, Compression::default());
            let mut tar = Builder::new(encoder);

            tar.append_dir_all(".", bundle_path)
                .map_err(BuildError::Io)?;

            let encoder = tar.into_inner().map_err(BuildError::Io)?;
            encoder.finish().map_err(BuildError::Io)?;
        }

        tracing::debug!("Build context created: {} bytes", archive_data.len());

        Self::check_context_size(archive_data.len());

        Ok(archive_data)
    }

    /// コンテキストサイズのチェックと警告
    fn check_context_size(size: usize) {
        // 設定バンドルとしては大きすぎる
        const MAX_CONTEXT_SIZE: usize = 64 * 1024 * 1024;

        if size > MAX_CONTEXT_SIZE {
            tracing::warn!(
                "警告: 設定バンドルが大きすぎます（{}MB）。不要なファイルが含まれていないか確認してください。",
                size / 1024 / 1024
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_create_context() {
        let temp_dir = tempdir().unwrap();

        fs::write(
            temp_dir.path().join("Dockerfile"),
            "FROM busybox\nCOPY . /cfg\nCMD cp -r /cfg/. /cfg-volume/",
        )
        .unwrap();
        let subdir = temp_dir.path().join("data");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("realm.json"), "{}").unwrap();

        let archive = ContextBuilder::create_context(temp_dir.path()).unwrap();
        assert!(!archive.is_empty());

        // tarアーカイブとして展開できるか確認
        let extract_dir = tempdir().unwrap();
        let decoder = flate2::read::GzDecoder::new(std::io::Cursor::new(archive));
        let mut tar = tar::Archive::new(decoder);
        tar.unpack(extract_dir.path()).unwrap();

        assert!(extract_dir.path().join("Dockerfile").exists());
        assert!(extract_dir.path().join("data/realm.json").exists());
    }

    #[test]
    fn test_create_context_missing_dir() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("keycloak");

        let result = ContextBuilder::create_context(&missing);
        assert!(matches!(result, Err(BuildError::ContextNotFound(p)) if p == missing));
    }

    #[test]
    fn test_create_context_without_dockerfile() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("redis.conf"), "appendonly yes").unwrap();

        let result = ContextBuilder::create_context(temp_dir.path());
        assert!(matches!(result, Err(BuildError::DockerfileNotFound(_))));
    }
}
