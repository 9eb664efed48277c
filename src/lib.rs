//! route-planner core
//!
//! Delivery route planning: screen candidate orders, keep the user's
//! selection, ask the routing service for routes and turn its answer into
//! drawable paths.

pub mod api;
pub mod error;
pub mod haversine;
pub mod model;
pub mod order_validator;
pub mod polyline;
pub mod resolver;
pub mod route_validator;
pub mod selection;
pub mod session;
pub mod traits;
pub mod wire;
