//! Runtime configuration, resolved once at startup.

use std::{env, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_API_URL: &str = "http://localhost:8000/predict";
pub const DEFAULT_IMAGE_DIR: &str = "test_images";
pub const DEFAULT_MASK_DIR: &str = "test_masks";

/// Resolved configuration, passed into the components that need it rather
/// than read from process-global state.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_url: String,
    pub image_dir: PathBuf,
    pub mask_dir: PathBuf,
}

impl Config {
    /// Read `PORT` and `API_URL` from the environment, falling back to the
    /// defaults. Directories default to the conventional test set layout.
    pub fn from_env() -> Self {
        Self {
            port: parse_port(env::var("PORT").ok()),
            api_url: env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned()),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            mask_dir: PathBuf::from(DEFAULT_MASK_DIR),
        }
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    match raw {
        Some(value) => match value.parse() {
            Ok(port) => port,
            Err(_) => {
                tracing::warn!("ignoring unparseable PORT value {value:?}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        },
        None => DEFAULT_PORT,
    }
}
