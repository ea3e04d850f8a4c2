//! Reviewer Roulette - pick a random code reviewer from a GitHub repository.
//!
//! This is the library behind the `reviewer-roulette` binary: the animation
//! engine that spins the card stack, the error taxonomy, the GitHub fetch
//! layer, and the persisted settings state machine.

pub mod animation;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};
