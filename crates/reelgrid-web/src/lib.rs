#![forbid(unsafe_code)]

//! Browser binding for the reelgrid infinite media grid.
//!
//! This crate provides `GridViewer`, a `wasm-bindgen`-exported struct that
//! renders the grid markup into a page section and drives a
//! [`reelgrid_runtime::Navigator`] from host callbacks.
//!
//! [`runner_core`] holds the platform-independent part and is what native
//! tests exercise; `wasm` adds the DOM scene and JS exports.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::GridViewer;

pub mod runner_core;

pub use runner_core::{GridRunner, HostSignal, RunnerError, RunnerSnapshot, TileUpdate};
