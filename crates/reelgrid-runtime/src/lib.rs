#![forbid(unsafe_code)]

//! Runtime: the pan/zoom navigator state machine.
//!
//! # Role in reelgrid
//! `reelgrid-runtime` turns host callbacks (input deltas, clicks, resizes,
//! animation frames) into camera transforms for the grid container. It is
//! the only place that decides who may write the container transform: the
//! pan smoothers or the zoom tween, never both.
//!
//! # Primary responsibilities
//! - **Navigator**: [`Navigator`] owns all per-mount state and implements the
//!   Idle → ZoomingIn → Focused → ZoomingOut cycle, including interruption,
//!   resize-while-focused, and re-entrant clicks.
//! - **Input observer**: [`InputObserver`] accumulates wheel and drag deltas
//!   and is physically detached during zoom.
//! - **Camera**: [`CameraTransform`] math (screen ↔ local, origin rebasing)
//!   and the single-writer [`CameraDriver`].
//! - **Deferred work**: [`DeferredQueue`] chains frame waits and delays with
//!   [`CancellationToken`]s, so stale re-attachments never fire.
//! - **Configuration**: [`NavigatorConfig`] policy-as-data, loadable from
//!   TOML/JSON with the `config-file` feature.
//!
//! # How it fits in the system
//! Hosts implement [`SceneHost`] over their document. `reelgrid-web` provides
//! the browser host; tests use `SimulatedScene` (feature `test-helpers`).
//! Logging goes through `tracing` under the `reelgrid.*` targets; no
//! subscriber is installed here.

pub mod camera;
pub mod cancellation;
pub mod config;
pub mod navigator;
pub mod observer;
pub mod scene;
pub mod scheduler;
pub mod zoom;

pub use camera::{CameraDriver, CameraPose, CameraTransform, LiveTween};
pub use cancellation::{CancellationSource, CancellationToken};
pub use config::{ConfigError, NavigatorConfig};
pub use navigator::{ClickOutcome, IgnoreReason, MountError, Navigator};
pub use observer::{InputObserver, ObserverOutcome, ObserverPolicy, PanTarget};
pub use scene::SceneHost;
#[cfg(feature = "test-helpers")]
pub use scene::SimulatedScene;
pub use scheduler::{DeferredQueue, DeferredTask, Step};
pub use zoom::{FocusPlan, SavedPanState, ZoomPhase, ZoomPolicy};
