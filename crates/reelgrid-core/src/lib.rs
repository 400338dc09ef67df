#![forbid(unsafe_code)]

//! Core: geometry, wrapping, grid layout, input events, and animation.
//!
//! # Role in reelgrid
//! `reelgrid-core` is the pure layer. Nothing here touches a host: there is
//! no DOM, no clock, and no logging. Every type is deterministic given its
//! inputs, which is what lets the runtime drive it from host-supplied
//! timestamps and lets tests replay interactions exactly.
//!
//! # Primary responsibilities
//! - **Wrap function**: maps an unbounded pan offset into one cell
//!   (`[-cell, 0)`), with a fixed `0px` sentinel until the grid is measured.
//! - **Grid**: column selection for `N` items and the primary-plus-duplicates
//!   block arrangement that makes the plane appear infinite.
//! - **Media**: ordered media items and the per-tile lazy-load state.
//! - **Input**: wheel/touch/pointer deltas and tap-versus-drag discrimination.
//! - **Animation**: easing curves, [`animation::Tween`], and the per-property
//!   [`animation::Smoother`] that gives pan input its inertia.
//!
//! # How it fits in the system
//! `reelgrid-runtime` owns the navigator state machine and consumes these
//! primitives. `reelgrid-web` binds the runtime to a browser document.

pub mod animation;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod grid;
pub mod media;
pub mod wrap;

pub use event::{InputEvent, InputKind};
pub use geometry::{Point, Rect, Size};
pub use gesture::{Tap, TapDetector};
pub use grid::{GridGeometry, GridLayout, TileId, optimal_grid_cols};
pub use media::{MediaItem, TileMedia};
pub use wrap::{WrapRange, WrappedOffset, wrap, wrap_offset};
