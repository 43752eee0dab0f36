pub mod postgres;
pub mod subscription;
pub mod user;

#[cfg(test)]
pub mod memory;

pub use postgres::PgStore;
pub use subscription::{Subscription, SubscriptionStore};
pub use user::{User, UserStore};
