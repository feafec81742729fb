pub mod app;
pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod services_handler;
pub mod shutdown;
