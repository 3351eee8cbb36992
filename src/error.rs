use std::path::PathBuf;

/// Errors produced by the dataset, codec, and prediction client.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("request to the prediction service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("prediction service returned HTTP {status}: {body}")]
    Request { status: u16, body: String },

    #[error("could not decode the prediction response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no image file for id {id:?} (expected {})", .path.display())]
    MissingImage { id: String, path: PathBuf },

    #[error("no mask file for id {id:?} (expected {})", .path.display())]
    MissingMask { id: String, path: PathBuf },
}
