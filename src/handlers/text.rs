use crate::handlers::{Handler, Opcode, RequestError};
use crate::reply::Reply;
use crate::store::Store;

/// Echoes the payload back in upper case.
#[derive(Debug, PartialEq)]
pub struct TextManager;

impl Handler for TextManager {
    fn handle(&self, opcode: Opcode, payload: &str, _store: &Store) -> Result<Reply, RequestError> {
        match opcode {
            Opcode::UppercaseText if payload.is_empty() => Err(RequestError::EmptyText),
            Opcode::UppercaseText => Ok(Reply::Success(payload.to_ascii_uppercase())),
            _ => Err(RequestError::UnknownOperation("text")),
        }
    }
}
