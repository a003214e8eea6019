//! 起動後コマンド実行
//!
//! 常駐サービスが running になるのを待ってからコマンドを実行し、出力をまとめて返す。

use crate::error::{ContainerError, Result};
use crate::gateway::ContainerGateway;
use crate::waiter::{PollConfig, await_terminal};
use bytes::Bytes;
use futures_util::StreamExt;
use hobbitflow_core::{PollTarget, ServiceHandle};
use tracing::{debug, info};

/// 多重化ストリームの各フレームに付くヘッダ長
pub const STREAM_HEADER_LEN: usize = 8;

/// サービスの起動を待ってコマンドを実行し、標準出力・標準エラーをまとめて返す
///
/// 出力ストリームは別タスクで終端まで読み切る。ストリームの終了以外に打ち切り条件はない。
pub async fn run_after_ready(
    gateway: &dyn ContainerGateway,
    handle: &ServiceHandle,
    command: &[String],
    poll: &PollConfig,
) -> Result<String> {
    await_terminal(gateway, handle, PollTarget::Running, poll).await?;

    let target = gateway
        .exec_target(handle)
        .await
        .map_err(|e| exec_failed(handle.name(), e))?;

    info!("running `{}` in {}", command.join(" "), target);
    let mut stream = gateway
        .exec(&target, command)
        .await
        .map_err(|e| exec_failed(&target, e))?;

    let drain = tokio::spawn(async move {
        let mut buffer = Vec::new();
        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok::<_, ContainerError>(buffer)
    });

    let raw = drain
        .await
        .map_err(|e| ContainerError::ExecFailed {
            target: target.clone(),
            message: e.to_string(),
        })?
        .map_err(|e| exec_failed(&target, e))?;

    debug!("exec output: {} bytes", raw.len());
    Ok(decode_output(&raw))
}

fn exec_failed(target: &str, err: ContainerError) -> ContainerError {
    match err {
        err @ ContainerError::ExecFailed { .. } => err,
        other => ContainerError::ExecFailed {
            target: target.to_string(),
            message: other.to_string(),
        },
    }
}

/// 出力バイト列をテキストにする
///
/// 多重化フレーム（種別1byte + 予約3byte + 長さ4byte BE）であれば各ヘッダを外して連結する。
/// フレームとして解釈できない場合は先頭の8byteだけを読み飛ばす。
pub fn decode_output(raw: &[u8]) -> String {
    match demultiplex(raw) {
        Some(payload) => String::from_utf8_lossy(&payload).into_owned(),
        None => String::from_utf8_lossy(raw.get(STREAM_HEADER_LEN..).unwrap_or_default())
            .into_owned(),
    }
}

fn demultiplex(raw: &[u8]) -> Option<Vec<u8>> {
    let mut payload = Vec::with_capacity(raw.len());
    let mut rest = raw;

    while !rest.is_empty() {
        if rest.len() < STREAM_HEADER_LEN {
            return None;
        }
        let (header, body) = rest.split_at(STREAM_HEADER_LEN);
        if header[0] > 2 || header[1..4] != [0, 0, 0] {
            return None;
        }
        let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;
        if body.len() < len {
            return None;
        }
        payload.extend_from_slice(&body[..len]);
        rest = &body[len..];
    }

    Some(payload)
}

/// 1フレーム分のバイト列を組み立てる（0: stdin, 1: stdout, 2: stderr）
pub fn encode_frame(stream_type: u8, message: &[u8]) -> Bytes {
    let mut framed = Vec::with_capacity(STREAM_HEADER_LEN + message.len());
    framed.push(stream_type);
    framed.extend_from_slice(&[0, 0, 0]);
    framed.extend_from_slice(&(message.len() as u32).to_be_bytes());
    framed.extend_from_slice(message);
    Bytes::from(framed)
}
