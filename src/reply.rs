use std::fmt;

use itertools::Itertools;

const LISTING_FOOTER: &str = "================================";

/// The outcome of a request. Clients only ever see the text produced by `Display`, so the legacy
/// prefixes (`SUCCESS:`, `ERROR:`, `FOUND:`) live here and nowhere else.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Success(String),
    Error(String),
    Found(String),
    Listing {
        title: &'static str,
        records: Vec<String>,
    },
    Count {
        label: &'static str,
        count: usize,
    },
}

impl Reply {
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Success(msg) => write!(f, "SUCCESS: {}", msg),
            Reply::Error(msg) => write!(f, "ERROR: {}", msg),
            Reply::Found(line) => write!(f, "FOUND: {}", line),
            Reply::Listing { title, records } if records.is_empty() => {
                write!(f, "No {} found", title)
            }
            Reply::Listing { title, records } => {
                let body = records
                    .iter()
                    .enumerate()
                    .map(|(i, line)| format!("{}. {}\n", i + 1, line))
                    .join("");
                write!(
                    f,
                    "\n========== {} ==========\n{}{}\n",
                    title, body, LISTING_FOOTER
                )
            }
            Reply::Count { label, count } => write!(f, "Total {}: {}", label, count),
        }
    }
}

impl From<Reply> for Vec<u8> {
    fn from(reply: Reply) -> Self {
        reply.serialize()
    }
}
