//! Complaint Book: user registration, bearer-token login and per-user
//! complaints over HTTP.

pub mod app;
pub mod auth;
pub mod complaints;
pub mod config;
pub mod error;
pub mod extract;
pub mod state;
