// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Business logic: validation, document assembly and the capabilities it uses.

pub mod builder;
pub mod crypto;
pub mod validate;
