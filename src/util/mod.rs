// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Value utilities used by the block lifecycle engine.
//!
//! Both operate on `serde_json::Value` trees so they stay general: the
//! engine only ever feeds them flat block collections, but the contract
//! covers arbitrarily nested mappings.

pub mod clone;
pub mod omit;

pub use clone::clone_deep;
pub use omit::omit_by;
