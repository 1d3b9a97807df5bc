//! User registration, log in and bearer token verification.

mod endpoints;
mod token;

pub use endpoints::{AuthResponse, LogInData, RegisterData, log_in_endpoint, register_endpoint};
pub use token::{Claims, decode_jwt, encode_jwt};
