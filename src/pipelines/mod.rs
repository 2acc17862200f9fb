// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for depth captures
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌─────────────────────┐
//! │ Color frame  │ ──▶ │  Photo encoding   │ ──▶ │ _colorImage.jpg     │
//! │ Depth map    │ ──▶ │  Normalize + PNG  │ ──▶ │ _depthImage.png     │
//! │ Calibration  │ ──▶ │  Metadata JSON    │ ──▶ │ _metadata.json      │
//! │ Motion       │     │                   │     │                     │
//! └──────────────┘     └───────────────────┘     └─────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: JPEG/PNG encoding of capture images
//! - [`capture`]: Capture records, the writer, and reading captures back

pub mod capture;
pub mod photo;
