//! Chat persistence abstractions and the chat store service.
//!
//! `ChatRepository` is implemented by the infrastructure layer; `ChatService`
//! owns preview derivation, id generation, and the save path that hands off
//! to the retention engine.

pub mod repository;
pub mod service;
