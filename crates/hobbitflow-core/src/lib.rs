//! HobbitFlow のコアデータモデル
//!
//! デプロイパイプラインの各コンポーネント（ポーラー・ランチャー・フィラー）が
//! 共有する型と、HOBBIT プラットフォームの固定トポロジーを定義します。

pub mod error;
pub mod model;
pub mod platform;

pub use error::*;
pub use model::*;
