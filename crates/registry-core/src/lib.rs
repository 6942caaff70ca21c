// ABOUTME: Core types and constants for the registry gateway
// ABOUTME: Foundation crate shared by the gateway binary and its integration tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! Dependency-light types shared across the registry gateway: the error
//! taxonomy, opaque cursor pagination for the discovery API, and
//! constants that would otherwise be duplicated between the HTTP layer and
//! the background subsystems.

pub mod constants;
pub mod errors;
pub mod pagination;

pub use errors::{AppError, AppResult, ErrorKind};
pub use pagination::{Cursor, CursorPage};
