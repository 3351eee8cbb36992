//! Browser front end for an image segmentation model served over HTTP.
//!
//! The crate loads image/mask pairs from a local test set, ships the image
//! to a remote prediction endpoint as base64-encoded PNG, and renders the
//! reference image, the ground-truth mask, and the predicted mask side by
//! side.

pub mod app;
pub mod client;
pub mod codec;
pub mod config;
pub mod dataset;
pub mod error;

pub use app::{router, AppState};
pub use client::PredictClient;
pub use config::Config;
pub use dataset::Dataset;
pub use error::Error;
