// Copyright 2026 Metalens Contributors
// SPDX-License-Identifier: Apache-2.0

//! Metalens library — fetch a page once, keep the metadata that matters.
//!
//! This library crate exposes the core modules for integration testing.

#![allow(
    dead_code,
    unused_imports,
    clippy::new_without_default,
    clippy::should_implement_trait
)]

pub mod cli;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod files;
pub mod pipeline;
pub mod rest;
pub mod server;
pub mod url_norm;
