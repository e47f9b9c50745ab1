//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, scheduler, undo queue, sink and persistence into
//!   use-case level APIs.
//! - Keep UI layers decoupled from component wiring.

pub mod tracker_service;
