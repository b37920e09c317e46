//! Application services: per-kind resolution and revalidation.

pub mod config_service;
pub mod error;
pub mod revalidation;
pub mod site_content;
