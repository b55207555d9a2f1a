//! Scene Index Core
//!
//! This crate provides the dependency forwarding machinery for composed
//! scene indices. It implements:
//!
//! - Data source locators and minimal locator sets
//! - A small data source model for prim data
//! - The scene index and observer contract, plus an in-memory input scene
//! - A filtering scene index that forwards dirty notices along declared
//!   data dependencies, with deferred cleanup of stale bookkeeping
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `base`: tokens and prim paths
//! - `locator`: `DataSourceLocator` and `DataSourceLocatorSet`
//! - `data_source`: containers and leaf values
//! - `scene`: the `SceneIndex` and `SceneIndexObserver` traits
//! - `dependencies`: declaration schema and the forwarding index
//! - `config`: forwarding index settings
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sceneindex_core::dependencies::DependencyForwardingSceneIndex;
//! use sceneindex_core::locator::DataSourceLocator;
//! use sceneindex_core::scene::{DirtiedPrimEntry, RetainedSceneIndex};
//!
//! // The scene edits arrive in
//! let input = Arc::new(RetainedSceneIndex::new());
//!
//! // The index downstream consumers observe
//! let index = DependencyForwardingSceneIndex::new(input.clone());
//!
//! // Dirtying /B's xform now also dirties every prim that declared a
//! // dependency on it (once those prims have been queried through `index`)
//! input.dirty_prims(&[DirtiedPrimEntry::new("/B".parse()?, DataSourceLocator::parse("xform"))]);
//! ```

pub mod base;
pub mod config;
pub mod data_source;
pub mod dependencies;
pub mod error;
pub mod locator;
pub mod scene;

pub use config::ForwardingConfig;
pub use error::{Error, Result};
