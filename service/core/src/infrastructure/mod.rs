// Copyright (c) 2026 Bonus Agreements Team
// SPDX-License-Identifier: AGPL-3.0

pub mod repositories;
pub mod db;
pub mod credentials;
pub mod strategies;
