//! Core 3-D pipe growth library behind the pipe screensaver.
//!
//! Main components:
//! - [`mesh`] — polygon meshes with extrusion, detachment and raycasts.
//! - [`bounds`] — axis-aligned boxes limiting where pipes may grow.
//! - [`raycast`] — ray/triangle tests and the scene collision query.
//! - [`pipe`] — the growth engine driving a single branch.
//! - [`family`] — the once-per-family finished notification.
//! - [`forest`] — arena of live branches and their split links.
//! - [`fade`] — timed opacity decay for finished pipes.
//! - [`spawner`] — population control: spawning, finishing and fading.
//! - [`config`] — per-branch and population settings.
//! - [`error`] — geometry errors.
//! - [`types`] — shared type aliases and IDs.

pub mod bounds;
pub mod config;
pub mod error;
pub mod fade;
pub mod family;
pub mod forest;
pub mod mesh;
pub mod pipe;
pub mod raycast;
pub mod spawner;
pub mod types;
