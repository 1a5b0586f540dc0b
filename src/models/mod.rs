pub mod activity;
pub mod stats;
pub mod user;
