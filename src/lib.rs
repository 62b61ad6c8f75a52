/// Filmorate server library.
/// Films, users, genres and MPA ratings over REST, with likes and mutual
/// friendships, backed by SQLite or process memory.
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod server;
pub mod service;
pub mod validation;
