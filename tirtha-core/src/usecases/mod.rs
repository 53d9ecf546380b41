//! Read queries and favorite mutations.
//!
//! Reads follow a fail-soft policy: a missing row yields `None`
//! or an empty list, every other backend failure is logged and
//! degraded the same way. Mutations return their errors.

mod cities;
mod events;
mod favorites;
mod languages;
mod load;
mod points;
mod profile;
mod relations;
mod routes;
mod search;

#[cfg(test)]
pub mod tests;

pub use self::{
    cities::*, events::*, favorites::*, languages::*, points::*, profile::*, relations::*,
    routes::*, search::*,
};

mod prelude {
    pub use crate::{
        diagnostics::DiagnosticsSink,
        entities::*,
        repositories::{value_to_key, Backend, Filter, Select},
    };
    pub use tirtha_boundary::tables;

    pub(crate) use super::load::*;
}
