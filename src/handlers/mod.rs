pub mod activities;
pub mod auth;
pub mod health;
pub mod stats;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;
