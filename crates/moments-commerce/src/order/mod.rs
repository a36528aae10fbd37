//! Orders and the order log.

mod log;
mod order;

pub use log::OrderLog;
pub use order::{Order, OrderStatus};
