pub mod admin;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod mail;
pub mod recording;
pub mod state;
pub mod storage;
pub mod users;

#[cfg(test)]
mod testing;
