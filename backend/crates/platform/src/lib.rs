//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, random tokens, constant-time compare)
//! - Password hashing (Argon2id with optional pepper)
//! - Rate limiting (limiter trait and in-process fixed-window counters)
//! - Client identification from HTTP headers

pub mod client;
pub mod clock;
pub mod crypto;
pub mod password;
pub mod rate_limit;
