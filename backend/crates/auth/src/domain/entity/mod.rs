//! Entity Module

pub mod personal_access_token;
pub mod user;
