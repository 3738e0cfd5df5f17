// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing logic independent of the UI toolkit.

pub mod controller;
