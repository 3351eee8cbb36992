//! PNG wire codec: the prediction service exchanges images as PNG bytes,
//! base64-framed inside the JSON envelope (see `client`).

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use crate::error::Error;

/// Serialize an in-memory image as PNG bytes.
pub fn encode(image: &DynamicImage) -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Parse PNG bytes back into an in-memory image.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, Error> {
    Ok(image::load_from_memory_with_format(bytes, ImageFormat::Png)?)
}
