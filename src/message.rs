// Wire format: <type>|<payload>
//
// The payload is not escaped. Only the first `|` separates the type code from the payload, so
// payloads that carry their own `|` (image uploads) pass through untouched.

use std::fmt;
use std::str;

use thiserror::Error as ThisError;

pub const DELIMITER: char = '|';

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("Invalid message format. Expected: MessageType|Data")]
    MissingDelimiter,
    #[error("Invalid message type ({0})")]
    InvalidType(String),
    #[error("Invalid message encoding; expected UTF-8 text")]
    InvalidUtf8(#[from] str::Utf8Error),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub kind: i64,
    pub payload: String,
}

impl Message {
    pub fn new(kind: i64, payload: impl Into<String>) -> Message {
        Message {
            kind,
            payload: payload.into(),
        }
    }

    pub fn parse(src: &[u8]) -> Result<Self, Error> {
        let text = str::from_utf8(src)?;

        let (kind, payload) = text
            .split_once(DELIMITER)
            .ok_or(Error::MissingDelimiter)?;

        let kind = kind
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::InvalidType(kind.to_string()))?;

        Ok(Message::new(kind, payload))
    }

    pub fn serialize(&self) -> Vec<u8> {
        encode(self.kind, &self.payload)
    }
}

/// Builds the `<type>|<payload>` bytes for a request.
pub fn encode(kind: impl fmt::Display, payload: &str) -> Vec<u8> {
    format!("{}{}{}", kind, DELIMITER, payload).into_bytes()
}

impl From<Message> for Vec<u8> {
    fn from(message: Message) -> Self {
        message.serialize()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind, DELIMITER, self.payload)
    }
}
