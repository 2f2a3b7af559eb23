pub mod auth;
pub mod register;
