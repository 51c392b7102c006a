//! Core use-case services.
//!
//! # Responsibility
//! - Expose `save_recipe`/`load_recipe` to the surrounding application.
//! - Keep CLI and other callers decoupled from storage details.

pub mod recipe_service;
