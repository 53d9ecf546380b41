#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # tirtha-entities
//!
//! Reusable, agnostic view-model entities for Tirtha.
//!
//! Entities are immutable snapshots that are rebuilt on every fetch.
//! They only contain generic functionality that does not reveal
//! anything about the backend they were loaded from.

pub mod city;
pub mod event;
pub mod favorite;
pub mod geo;
pub mod id;
pub mod language;
pub mod localized;
pub mod media;
pub mod point;
pub mod route;
pub mod time;
pub mod user;

#[cfg(any(test, feature = "builders"))]
pub mod builders;

/// Thumbnail used whenever an entity has no images at all.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
