//! Supabase Provider Core
//!
//! Core library for the Supabase resource provider: the dynamic property
//! model exchanged with the orchestration engine, the codec between property
//! bags and typed API shapes, the diff policies, and the handler traits each
//! resource kind implements.

pub mod codec;
pub mod diff;
pub mod error;
pub mod handler;
pub mod property;
