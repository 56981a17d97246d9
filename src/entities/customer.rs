use crate::entities::{Entity, FieldParser, ValidationError};

pub const MAX_AGE: i64 = 150;

#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: i64,
    pub full_name: String,
    pub age: i64,
    pub contact: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl Customer {
    pub fn parse(payload: &str) -> Result<Customer, ValidationError> {
        let mut parser = FieldParser::new("customer", payload);

        let id = parser.next_positive("Customer ID")?;
        let full_name = parser.next_string()?;
        let age = parser.next_integer()?;
        let contact = parser.next_string()?;
        let street = parser.next_string()?;
        let city = parser.next_string()?;
        let state = parser.next_string()?;
        let country = parser.next_string()?;
        parser.finish()?;

        if !(0..=MAX_AGE).contains(&age) {
            return Err(ValidationError::AgeOutOfRange(age));
        }

        Ok(Customer {
            id,
            full_name,
            age,
            contact,
            street,
            city,
            state,
            country,
        })
    }
}

impl Entity for Customer {
    const NAME: &'static str = "Customer";

    fn id(&self) -> i64 {
        self.id
    }

    fn to_line(&self) -> String {
        format!(
            "{} {} {} {} {} {} {} {}",
            self.id,
            self.full_name,
            self.age,
            self.contact,
            self.street,
            self.city,
            self.state,
            self.country
        )
    }
}
