//! Service plugin contract and registry.
//!
//! A service is a manifest plus a [`features::FeatureSet`] built by a
//! [`service::ServiceFactory`]. The [`registry`] merges built-in and
//! installed services; hosts call features through [`service::AnyService`].

pub mod builtin;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod features;
pub mod net;
pub mod registry;
pub mod service;
pub mod services;
pub mod storage;
pub mod testing;
