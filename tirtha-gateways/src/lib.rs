//! # tirtha-gateways
//!
//! Adapters that connect the ports of `tirtha-core` to the outer world.

pub mod memory;
pub mod storage;
pub mod supabase;
