pub mod authority;
pub mod customer;
pub mod menu;
pub mod revocation;
pub mod user;
