// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Domain layer: the pay document schema and the validation vocabulary shared
//! between the form and the builder.

pub mod document;
pub mod fields;
