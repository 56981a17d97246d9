use std::fmt;

use crate::entities::{Entity, FieldParser, ValidationError};
use crate::store::Table;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DressKind {
    Stitched,
    Unstitched,
}

impl DressKind {
    pub fn table(self) -> Table {
        match self {
            DressKind::Stitched => Table::StitchedDresses,
            DressKind::Unstitched => Table::UnstitchedDresses,
        }
    }

    /// The single letter orders use to pick a dress file.
    pub fn code(self) -> &'static str {
        match self {
            DressKind::Stitched => "S",
            DressKind::Unstitched => "U",
        }
    }

    pub fn from_code(code: &str) -> Result<DressKind, ValidationError> {
        match code {
            "S" => Ok(DressKind::Stitched),
            "U" => Ok(DressKind::Unstitched),
            other => Err(ValidationError::InvalidDressType(other.to_string())),
        }
    }

    fn entity(self) -> &'static str {
        match self {
            DressKind::Stitched => "stitched dress",
            DressKind::Unstitched => "unstitched dress",
        }
    }
}

impl fmt::Display for DressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fields that only one kind of dress carries, in file order.
#[derive(Clone, Debug, PartialEq)]
pub enum DressDetails {
    Stitched {
        design: String,
        embellishment: String,
        fit: String,
        sleeve: String,
    },
    Unstitched {
        fabric_width: String,
        dye_stability: String,
        cut_type: String,
        length: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dress {
    pub id: i64,
    pub name: String,
    pub actual_price: f64,
    pub color: String,
    pub material: String,
    pub brand: String,
    pub sizes: [String; 3],
    pub discounted_price: f64,
    pub details: DressDetails,
}

impl Dress {
    pub fn parse(kind: DressKind, payload: &str) -> Result<Dress, ValidationError> {
        let mut parser = FieldParser::new(kind.entity(), payload);

        let id = parser.next_positive("Dress ID")?;
        let name = parser.next_string()?;
        let actual_price = parser.next_price()?;
        let color = parser.next_string()?;
        let material = parser.next_string()?;
        let brand = parser.next_string()?;
        let sizes = [
            parser.next_string()?,
            parser.next_string()?,
            parser.next_string()?,
        ];
        let discounted_price = parser.next_price()?;

        let details = match kind {
            DressKind::Stitched => DressDetails::Stitched {
                design: parser.next_string()?,
                embellishment: parser.next_string()?,
                fit: parser.next_string()?,
                sleeve: parser.next_string()?,
            },
            DressKind::Unstitched => DressDetails::Unstitched {
                fabric_width: parser.next_string()?,
                dye_stability: parser.next_string()?,
                cut_type: parser.next_string()?,
                length: parser.next_string()?,
            },
        };

        parser.finish()?;

        Ok(Dress {
            id,
            name,
            actual_price,
            color,
            material,
            brand,
            sizes,
            discounted_price,
            details,
        })
    }

    pub fn kind(&self) -> DressKind {
        match self.details {
            DressDetails::Stitched { .. } => DressKind::Stitched,
            DressDetails::Unstitched { .. } => DressKind::Unstitched,
        }
    }
}

impl Entity for Dress {
    const NAME: &'static str = "Dress";

    fn id(&self) -> i64 {
        self.id
    }

    fn to_line(&self) -> String {
        let details = match &self.details {
            DressDetails::Stitched {
                design,
                embellishment,
                fit,
                sleeve,
            } => [design, embellishment, fit, sleeve],
            DressDetails::Unstitched {
                fabric_width,
                dye_stability,
                cut_type,
                length,
            } => [fabric_width, dye_stability, cut_type, length],
        };

        format!(
            "{} {} {:.2} {} {} {} {} {} {} {:.2} {} {} {} {}",
            self.id,
            self.name,
            self.actual_price,
            self.color,
            self.material,
            self.brand,
            self.sizes[0],
            self.sizes[1],
            self.sizes[2],
            self.discounted_price,
            details[0],
            details[1],
            details[2],
            details[3],
        )
    }
}
