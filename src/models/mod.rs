// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for annotations, projects, and the annotation store.

pub mod annotation;
pub mod project;
pub mod store;
