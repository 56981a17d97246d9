pub mod customer;
pub mod dress;
pub mod image;
pub mod order;
pub mod text;

use std::collections::HashMap;
use std::sync::Arc;

use strum_macros::{EnumIter, FromRepr, IntoStaticStr};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

use crate::entities::{self, Entity, ValidationError};
use crate::message::{self, Message};
use crate::orders::OrderError;
use crate::reply::Reply;
use crate::store::{self, Store, Table};

use customer::CustomerManager;
use dress::DressManager;
use image::ImageManager;
use order::OrderManager;
use text::TextManager;

/// Integer message type codes understood by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum Opcode {
    AddStitched = 1,
    AddUnstitched = 2,
    ViewStitched = 3,
    ViewUnstitched = 4,
    SearchStitched = 5,
    SearchUnstitched = 6,
    CountStitched = 9,
    CountUnstitched = 10,
    AddCustomer = 11,
    ViewCustomers = 12,
    SearchCustomer = 13,
    ProcessOrder = 16,
    ViewOrders = 17,
    SearchOrder = 18,
    SendImage = 19,
    UppercaseText = 20,
}

impl Opcode {
    pub fn code(self) -> i64 {
        self as u8 as i64
    }
}

impl TryFrom<i64> for Opcode {
    type Error = RequestError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        u8::try_from(code)
            .ok()
            .and_then(Opcode::from_repr)
            .ok_or(RequestError::UnknownRequestType(code))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Validation,
    Referential,
    Io,
    Protocol,
}

#[derive(Debug, ThisError)]
pub enum RequestError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Duplicate {entity} ID {id}")]
    DuplicateId { entity: &'static str, id: i64 },
    #[error("Record not found")]
    RecordNotFound,
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("Invalid image data format")]
    InvalidImageFormat,
    #[error("Invalid image name {0:?}")]
    InvalidImageName(String),
    #[error("Invalid image data encoding: {0}")]
    InvalidImageEncoding(#[from] base64::DecodeError),
    #[error("No text provided")]
    EmptyText,
    #[error(transparent)]
    Store(#[from] store::Error),
    #[error(transparent)]
    Protocol(#[from] message::Error),
    #[error("Unknown request type ({0})")]
    UnknownRequestType(i64),
    #[error("Unknown {0} operation")]
    UnknownOperation(&'static str),
}

impl RequestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::Invalid(e) if e.is_format() => ErrorKind::Format,
            RequestError::Invalid(_) => ErrorKind::Validation,
            RequestError::DuplicateId { .. } => ErrorKind::Validation,
            RequestError::RecordNotFound => ErrorKind::Referential,
            RequestError::Order(OrderError::DuplicateId(_) | OrderError::Invalid(_)) => {
                ErrorKind::Validation
            }
            RequestError::Order(OrderError::Store(_)) => ErrorKind::Io,
            RequestError::Order(_) => ErrorKind::Referential,
            RequestError::InvalidImageFormat
            | RequestError::InvalidImageEncoding(_)
            | RequestError::EmptyText => ErrorKind::Format,
            RequestError::InvalidImageName(_) => ErrorKind::Validation,
            RequestError::Store(_) => ErrorKind::Io,
            RequestError::Protocol(_)
            | RequestError::UnknownRequestType(_)
            | RequestError::UnknownOperation(_) => ErrorKind::Protocol,
        }
    }
}

/// Serves every opcode registered for it. A handler never touches files directly, all access
/// goes through the [`Store`].
pub trait Handler: Send + Sync {
    fn handle(&self, opcode: Opcode, payload: &str, store: &Store) -> Result<Reply, RequestError>;
}

/// The opcode → handler table, built once at startup and shared by every connection.
pub struct Dispatcher {
    handlers: HashMap<Opcode, Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new() -> Dispatcher {
        let mut dispatcher = Dispatcher {
            handlers: HashMap::new(),
        };

        dispatcher.register(
            &[
                Opcode::AddStitched,
                Opcode::ViewStitched,
                Opcode::SearchStitched,
                Opcode::CountStitched,
            ],
            Arc::new(DressManager::stitched()),
        );
        dispatcher.register(
            &[
                Opcode::AddUnstitched,
                Opcode::ViewUnstitched,
                Opcode::SearchUnstitched,
                Opcode::CountUnstitched,
            ],
            Arc::new(DressManager::unstitched()),
        );
        dispatcher.register(
            &[
                Opcode::AddCustomer,
                Opcode::ViewCustomers,
                Opcode::SearchCustomer,
            ],
            Arc::new(CustomerManager),
        );
        dispatcher.register(
            &[Opcode::ProcessOrder, Opcode::ViewOrders, Opcode::SearchOrder],
            Arc::new(OrderManager),
        );
        dispatcher.register(&[Opcode::SendImage], Arc::new(ImageManager));
        dispatcher.register(&[Opcode::UppercaseText], Arc::new(TextManager));

        dispatcher
    }

    fn register(&mut self, opcodes: &[Opcode], handler: Arc<dyn Handler>) {
        for opcode in opcodes {
            self.handlers.insert(*opcode, handler.clone());
        }
    }

    pub fn handler(&self, opcode: Opcode) -> Option<&Arc<dyn Handler>> {
        self.handlers.get(&opcode)
    }

    /// Runs a request to completion. Failures become `ERROR:` replies here; nothing escapes to
    /// the connection loop.
    pub fn dispatch(&self, message: &Message, store: &Store) -> Reply {
        match self.try_dispatch(message, store) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(kind = ?e.kind(), request_type = message.kind, "request failed: {}", e);
                Reply::Error(e.to_string())
            }
        }
    }

    fn try_dispatch(&self, message: &Message, store: &Store) -> Result<Reply, RequestError> {
        let opcode = Opcode::try_from(message.kind)?;
        let handler = self
            .handler(opcode)
            .ok_or(RequestError::UnknownRequestType(message.kind))?;

        let name: &'static str = opcode.into();
        debug!(opcode = name, "dispatching request");
        handler.handle(opcode, &message.payload, store)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates uniqueness and appends inside a single critical section, so two concurrent adds of
/// the same id cannot both succeed.
fn add_unique<E: Entity>(store: &Store, table: Table, entity: &E) -> Result<(), RequestError> {
    let mut store = store.lock();

    if !store.is_id_unique(entity.id(), table)? {
        return Err(RequestError::DuplicateId {
            entity: E::NAME,
            id: entity.id(),
        });
    }

    store.append(table, &entity.to_line())?;
    Ok(())
}

fn view(store: &Store, table: Table, title: &'static str) -> Result<Reply, RequestError> {
    let records = store.lock().read_all(table)?;
    Ok(Reply::Listing { title, records })
}

fn search(
    store: &Store,
    table: Table,
    payload: &str,
    entity: &'static str,
) -> Result<Reply, RequestError> {
    let id = entities::parse_search_id(payload, entity)?;

    match store.lock().find_by_id(id, table)? {
        Some(line) => Ok(Reply::Found(line)),
        None => Err(RequestError::RecordNotFound),
    }
}
