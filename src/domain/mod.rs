//! Domain layer: entities, value objects, listing queries and the ports that
//! adapters implement.

pub mod money;
pub mod payout;
pub mod ports;
pub mod query;
pub mod vendor;
