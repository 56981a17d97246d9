use thiserror::Error as ThisError;
use tracing::debug;

use crate::entities::{Entity, Order, OrderRequest, ValidationError};
use crate::store::{self, Store, Table};

#[derive(Debug, ThisError)]
pub enum OrderError {
    #[error("Duplicate Order ID {0}")]
    DuplicateId(i64),
    #[error("Customer ID {0} not found")]
    CustomerNotFound(i64),
    #[error("Dress ID {id} not found in {table}")]
    DressNotFound { id: i64, table: Table },
    #[error("Unable to retrieve price for Dress ID {0}")]
    PriceUnavailable(i64),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] store::Error),
}

/// Validates an order against the customer and dress files, prices it, and appends it to the
/// order file.
///
/// The whole sequence runs under one store lock, so a concurrent request can neither claim the
/// same order id nor observe a half-written order. Nothing is written unless every check passes.
pub fn process_order(store: &Store, request: OrderRequest) -> Result<Order, OrderError> {
    let mut store = store.lock();

    if !store.is_id_unique(request.id, Table::Orders)? {
        return Err(OrderError::DuplicateId(request.id));
    }

    if store
        .find_by_id(request.customer_id, Table::Customers)?
        .is_none()
    {
        return Err(OrderError::CustomerNotFound(request.customer_id));
    }

    let table = request.dress_kind.table();
    if store.find_by_id(request.dress_id, table)?.is_none() {
        return Err(OrderError::DressNotFound {
            id: request.dress_id,
            table,
        });
    }

    let price = match store.get_field_price(request.dress_id, table)? {
        Some(price) if price >= 0.0 => price,
        _ => return Err(OrderError::PriceUnavailable(request.dress_id)),
    };

    let order = request.priced(price)?;
    store.append(Table::Orders, &order.to_line())?;
    debug!(order_id = order.id(), total = order.total, "order recorded");

    Ok(order)
}
