//! # tirtha-core
//!
//! Everything between the raw backend and the views:
//! the ports to the outer world, the read queries with
//! their fail-soft policy, a deduplicating query cache
//! and the application-scoped session and translation stores.

pub mod cache;
pub mod catalog;
pub mod diagnostics;
pub mod gateways;
pub mod i18n;
pub mod repositories;
pub mod session;
pub mod usecases;

pub mod entities {
    pub use tirtha_entities::{
        city::*, event::*, favorite::*, geo::*, id::*, language::*, localized::*, media::*,
        point::*, route::*, time::*, user::*, PLACEHOLDER_IMAGE,
    };
}
