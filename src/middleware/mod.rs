//! Request middleware applied ahead of route handlers.

pub mod gate;
pub mod secure_headers;
pub mod trailing_slash;
