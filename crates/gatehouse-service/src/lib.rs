pub mod auth;
pub mod authority;
pub mod context;
pub mod customer;
pub mod error;
pub mod menu;
pub mod seed;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;
