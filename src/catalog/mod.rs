//! Catalog aggregation: Hub API client, descriptor resolution and the
//! cached store behind the module and license screens.

pub mod client;
pub mod resolver;
pub mod store;
