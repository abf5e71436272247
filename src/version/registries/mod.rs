//! Registry implementations for fetching package metadata

pub mod github;
pub mod npm;

pub use github::GitHubReleases;
pub use npm::NpmRegistry;
