use crate::entities::{DressKind, Entity, FieldParser, ValidationError};

/// What a client sends to place an order. The total is not part of the request; the server
/// prices the order from the dress file.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderRequest {
    pub id: i64,
    pub customer_id: i64,
    pub dress_id: i64,
    pub dress_kind: DressKind,
    pub quantity: i64,
}

impl OrderRequest {
    pub fn parse(payload: &str) -> Result<OrderRequest, ValidationError> {
        let mut parser = FieldParser::new("order", payload);

        let id = parser.next_positive("Order ID")?;
        let customer_id = parser.next_positive("Customer ID")?;
        let dress_id = parser.next_positive("Dress ID")?;
        let dress_kind = DressKind::from_code(&parser.next_string()?)?;
        let quantity = parser.next_positive("Quantity")?;
        parser.finish()?;

        Ok(OrderRequest {
            id,
            customer_id,
            dress_id,
            dress_kind,
            quantity,
        })
    }

    pub fn priced(self, unit_price: f64) -> Result<Order, ValidationError> {
        let total = unit_price * self.quantity as f64;
        if !total.is_finite() {
            return Err(ValidationError::TotalOutOfRange);
        }

        Ok(Order {
            total,
            request: self,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    pub request: OrderRequest,
    pub total: f64,
}

impl Entity for Order {
    const NAME: &'static str = "Order";

    fn id(&self) -> i64 {
        self.request.id
    }

    fn to_line(&self) -> String {
        let r = &self.request;
        format!(
            "{} {} {} {} {} {:.2}",
            r.id, r.customer_id, r.dress_id, r.dress_kind, r.quantity, self.total
        )
    }
}
