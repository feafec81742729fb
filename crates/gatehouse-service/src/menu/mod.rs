pub mod service;
pub mod tree;
