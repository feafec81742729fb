pub mod cache;
pub mod captcha;
pub mod gate;
pub mod guard;
pub mod identity;
pub mod password;
pub mod revocation;
pub mod session;
pub mod token;
