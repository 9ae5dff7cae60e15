//! Google Earth Engine REST access.
//!
//! This module provides:
//! - A computation graph builder and its wire format
//! - Typed image, collection and geometry wrappers
//! - The REST client for compute and export calls

pub mod client;
pub mod expr;
pub mod objects;
pub mod types;

pub use client::{EarthEngineApi, EE_API_BASE};
pub use expr::{Expression, Node};
pub use objects::{
    Feature, FeatureCollection, Filter, Geometry, Image, ImageCollection, Reducer,
};
pub use types::{ImageExport, Operation, TaskState, TableExport};
