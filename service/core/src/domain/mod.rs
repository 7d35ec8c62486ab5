// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0
//! Domain Layer
//!
//! Aggregates, value objects and repository contracts for supplier bonus
//! agreements. Nothing in here touches HTTP or SQL directly.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Business invariants and persistence interfaces

pub mod agreement;
pub mod reference;
pub mod calculation;
pub mod user;
pub mod repository;
pub mod service_config;
