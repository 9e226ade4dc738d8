//! Route handlers

pub mod alerts;
pub mod auth;
pub mod health;
