pub mod ads;
pub mod connection;

pub use ads::insert_ads;
pub use connection::Database;

#[cfg(test)]
pub use ads::{count_ads, get_ads};
