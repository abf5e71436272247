//! Version layer: semantic-version arithmetic and registry lookups
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│   Lookup    │◀────│ ReleaseHost │
//! │ (npm meta)  │     │ (degrades)  │     │  (GitHub)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐
//!                     │   Semver    │
//!                     │ (distance)  │
//!                     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`semver`]: Range-prefix normalization, parsing and version distance
//! - [`registry`]: Collaborator traits for the registry and the release host
//! - [`registries`]: Concrete implementations (npm, GitHub releases)
//! - [`lookup`]: Latest version plus documentation URL, never fatal
//! - [`error`]: Error types for registry operations
//! - [`types`]: Metadata and repository URL types

pub mod error;
pub mod lookup;
pub mod registries;
pub mod registry;
pub mod semver;
pub mod types;
