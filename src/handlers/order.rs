use crate::entities::OrderRequest;
use crate::handlers::{search, view, Handler, Opcode, RequestError};
use crate::orders::process_order;
use crate::reply::Reply;
use crate::store::{Store, Table};

#[derive(Debug, PartialEq)]
pub struct OrderManager;

impl Handler for OrderManager {
    fn handle(&self, opcode: Opcode, payload: &str, store: &Store) -> Result<Reply, RequestError> {
        match opcode {
            Opcode::ProcessOrder => {
                let request = OrderRequest::parse(payload)?;
                let order = process_order(store, request)?;

                Ok(Reply::Success(format!(
                    "Successfully processed order (Total: ${:.2})",
                    order.total
                )))
            }
            Opcode::ViewOrders => view(store, Table::Orders, "ORDERS"),
            Opcode::SearchOrder => search(store, Table::Orders, payload, "Order"),
            _ => Err(RequestError::UnknownOperation("order")),
        }
    }
}
