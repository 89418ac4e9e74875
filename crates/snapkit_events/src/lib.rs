//! Snapkit Events
//!
//! Scroll-snap change notifications for hosts that do not raise them:
//!
//! - **Resolution**: [`SnapTargetResolver`] finds the element a container is
//!   snapped to along each axis from geometry alone
//! - **Change detection**: per-emulator delta tracking and last-announced state
//! - **Settle detection**: a debounced stand-in for a missing scroll-end signal
//! - **Activation**: emulators are installed on first subscription and torn
//!   down with the last one
//! - **Runtime**: [`SnapEventRuntime`] dispatches raw host signals and the
//!   notifications derived from them

pub mod activation;
pub mod change;
pub mod delta;
pub mod emulator;
pub mod listeners;
pub mod resolver;
pub mod runtime;
pub mod settle;

pub use activation::{ActivationManager, ActivationOutcome};
pub use change::{LastSnapped, SnapChangeDetector, WeakElement};
pub use delta::{ScrollDelta, ScrollDeltaTracker};
pub use emulator::{Emulator, EmulatorId, SettleMode};
pub use listeners::{EventCallback, ListenerId, ListenerOptions};
pub use resolver::{get_snap_target_horizontal, get_snap_target_vertical, SnapTargetResolver};
pub use runtime::SnapEventRuntime;
pub use settle::{PointerTracker, SettleDetector};
