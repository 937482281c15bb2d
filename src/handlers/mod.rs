// src/handlers/mod.rs

pub mod sanitize;
pub mod upload;
pub mod validation;
