// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Reusable egui components structured for MVU-style updates.

pub mod expiry_picker;
pub mod toggle;

pub use toggle::toggle_switch;
