//! Route handlers

pub mod frontend;
pub mod share_target;

pub use frontend::{index, serve_asset, Frontend};
pub use share_target::{share_target, SHARE_TARGET_PATH};
