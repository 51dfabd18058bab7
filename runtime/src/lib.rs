// Copyright 2026 Pricewalk Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pricewalk runtime library: category traversal and per-unit price
//! normalization for JavaScript-rendered storefronts.
//!
//! [`traversal::Traversal`] is the entry point; [`pricing::normalize`] can
//! be used on its own.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod navigation;
pub mod pricing;
pub mod renderer;
pub mod rest;
pub mod stealth;
pub mod traversal;

pub use error::TraversalError;
pub use model::CatalogItem;
pub use traversal::{Traversal, TraversalReport};
