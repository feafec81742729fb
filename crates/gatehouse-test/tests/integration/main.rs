//! HTTP-level tests over the full router and an in-memory store, plus store
//! tests against PostgreSQL when one is configured.

mod authority;
mod customer;
mod helpers;
mod menu;
mod postgres;
mod session;
mod user;
