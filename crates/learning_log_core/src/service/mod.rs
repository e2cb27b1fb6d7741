//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the journal and account use-cases.
//! - Keep the HTTP layer decoupled from storage details.

pub mod account_service;
pub mod journal_service;
