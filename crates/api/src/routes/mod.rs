//! HTTP route handlers

pub mod deblur;
pub mod health;
