// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Bonus Agreements Core
//!
//! Supplier bonus agreements: reference data, lifecycle rules and bonus
//! calculation dispatch.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Hosts the domain model, application services, persistence
//!   adapters and the HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
