pub mod activity_store;
#[cfg(test)]
pub mod memory;
pub mod pool;
pub mod user_store;

pub use activity_store::{ActivityStore, PgActivityStore};
pub use pool::create_pool;
pub use user_store::{PgUserStore, UserStore};
