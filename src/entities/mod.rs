pub mod customer;
pub mod dress;
pub mod order;

use std::str::{FromStr, SplitWhitespace};

use thiserror::Error as ThisError;

pub use customer::Customer;
pub use dress::{Dress, DressKind};
pub use order::{Order, OrderRequest};

/// A record type with its own flat file. Implementors parse a client payload into a validated
/// value and render it back as the canonical line that gets stored.
pub trait Entity: Sized {
    /// Used in duplicate-id messages, e.g. `Duplicate Customer ID 3`.
    const NAME: &'static str;

    fn id(&self) -> i64;

    fn to_line(&self) -> String;
}

#[derive(Debug, ThisError, PartialEq)]
pub enum ValidationError {
    #[error("Invalid {0} data format")]
    InvalidFormat(&'static str),
    #[error("Invalid {0} ID format")]
    InvalidId(&'static str),
    #[error("Prices must be non-negative")]
    NegativePrice,
    #[error("Age must be between 0 and 150")]
    AgeOutOfRange(i64),
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("Dress type must be S or U, got {0}")]
    InvalidDressType(String),
    #[error("Order total is out of range")]
    TotalOutOfRange,
}

impl ValidationError {
    /// Malformed input, as opposed to well-formed input with an out-of-range value.
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            ValidationError::InvalidFormat(_) | ValidationError::InvalidId(_)
        )
    }
}

/// Parses the id a search request carries as its whole payload.
pub fn parse_search_id(payload: &str, entity: &'static str) -> Result<i64, ValidationError> {
    payload
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidId(entity))
}

/// Walks the whitespace separated fields of a payload. Any missing or unparsable field is
/// reported as a format error for the whole record.
pub(crate) struct FieldParser<'a> {
    entity: &'static str,
    fields: SplitWhitespace<'a>,
}

impl<'a> FieldParser<'a> {
    pub(crate) fn new(entity: &'static str, payload: &'a str) -> FieldParser<'a> {
        FieldParser {
            entity,
            fields: payload.split_whitespace(),
        }
    }

    pub(crate) fn next_string(&mut self) -> Result<String, ValidationError> {
        self.next_field().map(str::to_string)
    }

    pub(crate) fn next_integer(&mut self) -> Result<i64, ValidationError> {
        self.next_parsed()
    }

    pub(crate) fn next_positive(&mut self, field: &'static str) -> Result<i64, ValidationError> {
        let value = self.next_integer()?;
        if value <= 0 {
            return Err(ValidationError::NotPositive(field));
        }
        Ok(value)
    }

    pub(crate) fn next_price(&mut self) -> Result<f64, ValidationError> {
        let price: f64 = self.next_parsed()?;
        if !price.is_finite() {
            return Err(self.format_error());
        }
        if price < 0.0 {
            return Err(ValidationError::NegativePrice);
        }
        Ok(price)
    }

    /// Fails if the payload has more fields than the record layout.
    pub(crate) fn finish(mut self) -> Result<(), ValidationError> {
        match self.fields.next() {
            Some(_) => Err(self.format_error()),
            None => Ok(()),
        }
    }

    fn next_parsed<T: FromStr>(&mut self) -> Result<T, ValidationError> {
        let field = self.next_field()?;
        field.parse::<T>().map_err(|_| self.format_error())
    }

    fn next_field(&mut self) -> Result<&'a str, ValidationError> {
        self.fields.next().ok_or_else(|| self.format_error())
    }

    fn format_error(&self) -> ValidationError {
        ValidationError::InvalidFormat(self.entity)
    }
}
