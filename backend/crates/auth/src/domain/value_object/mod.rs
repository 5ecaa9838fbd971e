//! Value Object Module

pub mod email;
pub mod plain_text_token;
pub mod token_id;
pub mod user_id;
pub mod user_password;
