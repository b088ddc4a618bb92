//! Business logic and repository trait definitions for chatkeep.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the services built on them: credentials, session
//! tokens, settings, chats, and chat retention. It depends only on
//! `chatkeep-types` -- never on `chatkeep-infra` or any database/IO crate.

pub mod chat;
pub mod repository;
pub mod retention;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;
