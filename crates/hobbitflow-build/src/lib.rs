//! HobbitFlow image build functionality
//!
//! This crate packs configuration bundles into Docker build contexts and
//! builds the short-lived "volume filler" images from them.

pub mod builder;
pub mod context;
pub mod error;

pub use builder::{BuiltImage, ImageBuilder};
pub use context::ContextBuilder;
pub use error::{BuildError, BuildResult};
