// src/handlers.rs

pub mod accounts;
pub mod auth;
pub mod jobs;
pub mod leads;
