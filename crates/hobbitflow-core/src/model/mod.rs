//! モデル定義
//!
//! デプロイ 1 回分の実行で生成・消費されるデータモデルを定義します。
//! 永続化はせず、エンジン側に残るボリューム・ネットワーク以外は実行終了とともに破棄されます。

mod answers;
mod backend;
mod descriptor;
mod handle;
mod log;
mod settings;
mod status;

// Re-exports
pub use answers::*;
pub use backend::*;
pub use descriptor::*;
pub use handle::*;
pub use log::*;
pub use settings::*;
pub use status::*;
