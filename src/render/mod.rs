// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene construction shared by the canvas and the SVG exporter.

pub mod color;
pub mod scene;
