// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types shared across the crate
//!
//! - [`config`]: fetch sizing (block chunks, explorer pages)
//! - [`log`]: raw log entries and their identity keys
//! - [`tokens`]: token metadata, raw and normalized amounts

pub mod config;
pub mod log;
pub mod tokens;
