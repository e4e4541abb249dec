//! Virtual clothing try-on pipeline: portrait segmentation, alpha
//! compositing and parametric garment placement, backed by a filesystem
//! catalog and per-user try-on history.

pub mod auth;
pub mod catalog;
pub mod compose;
pub mod loader;
pub mod segmentation;
pub mod session;
pub mod store;
