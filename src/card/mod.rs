pub mod database;
pub mod record;
pub mod types;

pub use database::{CardDatabase, CardDatabaseError};
pub use record::{CardFace, CardPrices, CardRecord};
pub use types::{parse_color_identity, Card, CardRole, ManaColor, RoleSet};
