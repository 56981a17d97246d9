use crate::entities::Customer;
use crate::handlers::{add_unique, search, view, Handler, Opcode, RequestError};
use crate::reply::Reply;
use crate::store::{Store, Table};

#[derive(Debug, PartialEq)]
pub struct CustomerManager;

impl Handler for CustomerManager {
    fn handle(&self, opcode: Opcode, payload: &str, store: &Store) -> Result<Reply, RequestError> {
        match opcode {
            Opcode::AddCustomer => {
                let customer = Customer::parse(payload)?;
                add_unique(store, Table::Customers, &customer)?;

                Ok(Reply::Success(format!(
                    "Customer added successfully (ID: {})",
                    customer.id
                )))
            }
            Opcode::ViewCustomers => view(store, Table::Customers, "CUSTOMERS"),
            Opcode::SearchCustomer => search(store, Table::Customers, payload, "Customer"),
            _ => Err(RequestError::UnknownOperation("customer")),
        }
    }
}
