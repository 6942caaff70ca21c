// ABOUTME: Library entry point for the registry and discovery gateway
// ABOUTME: Wires the storage-backend abstraction, hybrid search, scope resolver, and lifecycle orchestrator

#![deny(unsafe_code)]

//! # Registry Gateway
//!
//! A registry and discovery gateway for Model Context Protocol (MCP) servers
//! and A2A agents. Holds the authoritative catalog, applies fine-grained
//! access control, runs hybrid semantic+keyword search, tracks health state,
//! and federates external upstream registries.
//!
//! ## Architecture
//!
//! - [`config`] — immutable process configuration, built once at startup
//! - [`models`] — entity shapes shared across every layer
//! - [`repository`] — storage-backend abstraction (file, `DocumentDB`, `MongoDB`)
//! - [`search`] — embedding adapters and the hybrid query engine
//! - [`services`] — entity lifecycle, scope resolution, health, federation
//! - [`http`] — the bearer-authenticated API surface and discovery endpoints

pub mod config;
pub mod http;
pub mod models;
pub mod repository;
pub mod search;
pub mod services;
