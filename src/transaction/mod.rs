pub mod model;
pub mod pool;

pub use model::{NewTransaction, Transaction, unix_now};
pub use pool::PendingPool;
