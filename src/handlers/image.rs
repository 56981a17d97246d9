use tracing::info;

use crate::codec::decode_image;
use crate::handlers::{Handler, Opcode, RequestError};
use crate::message::DELIMITER;
use crate::reply::Reply;
use crate::store::Store;

/// Stores client images under the data directory. The payload is `<name>|<base64 data>`; an
/// upload with an existing name replaces the old file.
#[derive(Debug, PartialEq)]
pub struct ImageManager;

impl Handler for ImageManager {
    fn handle(&self, opcode: Opcode, payload: &str, store: &Store) -> Result<Reply, RequestError> {
        if opcode != Opcode::SendImage {
            return Err(RequestError::UnknownOperation("image"));
        }

        let (name, data) = payload
            .split_once(DELIMITER)
            .ok_or(RequestError::InvalidImageFormat)?;

        validate_name(name)?;
        let bytes = decode_image(data)?;

        let path = store.lock().save_image(name, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "image saved");

        Ok(Reply::Success(format!("Image {} received", name)))
    }
}

// Names are used as file names inside the image folder and must not escape it.
fn validate_name(name: &str) -> Result<(), RequestError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(RequestError::InvalidImageName(name.to_string()));
    }
    Ok(())
}
