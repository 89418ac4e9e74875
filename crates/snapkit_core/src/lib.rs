//! Snapkit Core
//!
//! The data model shared by the snap event engine:
//!
//! - **Element Tree**: generational [`ElementId`]s and the in-memory [`SnapTree`]
//! - **Style & Geometry**: parsed snap style and the [`StyleAndGeometryProvider`] capability
//! - **Events**: host objects, event types and the [`Event`] record
//! - **Timers**: a host-driven [`TimerQueue`]
//! - **Configuration**: [`EngineConfig`] loaded from TOML
//!
//! # Example
//!
//! ```rust
//! use snapkit_core::{Rect, SnapAlign, SnapStyle, SnapTree, SnapType, StyleAndGeometryProvider};
//!
//! let mut tree = SnapTree::new();
//! let scroller = tree.create_root(
//!     Rect::new(0.0, 0.0, 200.0, 100.0),
//!     SnapStyle::container(SnapType::X),
//! );
//! let slide = tree
//!     .append_child(
//!         scroller,
//!         Rect::new(200.0, 0.0, 200.0, 100.0),
//!         SnapStyle::aligned(SnapAlign::parse("start")),
//!     )
//!     .unwrap();
//!
//! assert_eq!(tree.bounding_rect(slide).map(|r| r.left()), Some(200.0));
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod provider;
pub mod style;
pub mod timer;
pub mod tree;

pub use config::{EngineConfig, HostFeatures, ResolverConfig, SettleConfig};
pub use error::{ConfigError, StyleParseError, TreeError};
pub use events::{Event, EventSerial, EventTarget, EventType, PointerId, SnapEventKind};
pub use geometry::{Edges, Point, Rect, Size};
pub use provider::{ScrollMetrics, StyleAndGeometryProvider};
pub use style::{
    parse_edges, parse_length, LogicalAxis, PhysicalAxis, PhysicalSnapAxes, SnapAlign,
    SnapAlignKeyword, SnapStyle, SnapType, WritingMode,
};
pub use timer::{TimerId, TimerQueue};
pub use tree::{ElementId, SnapTree};
