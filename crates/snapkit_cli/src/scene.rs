//! Scene files
//!
//! A scene describes one scroll container, its descendants and, optionally,
//! a scripted scroll session:
//!
//! ```toml
//! [container]
//! name = "carousel"
//! frame = [0, 0, 200, 100]
//! style = "scroll-snap-type: x mandatory"
//!
//! [[container.children]]
//! name = "first"
//! frame = [0, 0, 200, 100]
//! style = "scroll-snap-align: start"
//!
//! [[step]]
//! at_ms = 0
//! scroll_left = 205
//! ```

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use snapkit_core::{
    ElementId, EngineConfig, Event, EventTarget, Point, PointerId, Rect, Size, SnapEventKind,
    SnapStyle, SnapTree, StyleAndGeometryProvider,
};
use snapkit_events::{ListenerOptions, SnapEventRuntime};
use tracing::{debug, warn};

// =============================================================================
// Scene description
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct Scene {
    pub container: NodeSpec,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// One element; frames are `[x, y, width, height]` relative to the parent
#[derive(Debug, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub frame: [f32; 4],
    #[serde(default)]
    pub style: String,
    /// Explicit scrollable content size, `[width, height]`
    #[serde(default)]
    pub content: Option<[f32; 2]>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// One scripted moment of a scroll session
#[derive(Debug, Default, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    #[serde(default)]
    pub scroll_left: Option<f32>,
    #[serde(default)]
    pub scroll_top: Option<f32>,
    #[serde(default)]
    pub touch_start: Vec<u64>,
    #[serde(default)]
    pub touch_end: Vec<u64>,
    /// Raise the host's native scroll-end signal
    #[serde(default)]
    pub scroll_end: bool,
}

impl Step {
    fn moves(&self) -> bool {
        self.scroll_left.is_some() || self.scroll_top.is_some()
    }
}

fn rect(frame: [f32; 4]) -> Rect {
    Rect::new(frame[0], frame[1], frame[2], frame[3])
}

fn pointers(ids: &[u64]) -> Vec<PointerId> {
    ids.iter().copied().map(PointerId).collect()
}

impl Scene {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse scene")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Build the element tree; returns it with the container's id
    pub fn build(&self) -> Result<(SnapTree, ElementId)> {
        let mut tree = SnapTree::new();
        let style = parse_style(&self.container)?;
        let root = tree.create_root(rect(self.container.frame), style);
        configure(&mut tree, root, &self.container);
        for child in &self.container.children {
            append(&mut tree, root, child)?;
        }
        Ok((tree, root))
    }
}

fn parse_style(node: &NodeSpec) -> Result<SnapStyle> {
    SnapStyle::from_css(&node.style).with_context(|| format!("Invalid style on '{}'", node.name))
}

fn configure(tree: &mut SnapTree, id: ElementId, node: &NodeSpec) {
    tree.set_name(id, node.name.clone());
    if let Some([width, height]) = node.content {
        tree.set_content_size(id, Size::new(width, height));
    }
}

fn append(tree: &mut SnapTree, parent: ElementId, node: &NodeSpec) -> Result<()> {
    let style = parse_style(node)?;
    let id = tree
        .append_child(parent, rect(node.frame), style)
        .with_context(|| format!("Failed to add '{}'", node.name))?;
    configure(tree, id, node);
    for child in &node.children {
        append(tree, id, child)?;
    }
    Ok(())
}

// =============================================================================
// Replay
// =============================================================================

/// A notification observed during replay
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub at: Duration,
    pub kind: SnapEventKind,
    pub block: Option<String>,
    pub inline: Option<String>,
}

/// Run the scene's steps against a fresh runtime, subscribed to both kinds on
/// the container
pub fn replay(scene: &Scene, config: EngineConfig) -> Result<Vec<Notification>> {
    let (tree, container) = scene.build()?;
    let quiet_period = config.settle.quiet_period();
    let mut runtime = SnapEventRuntime::new(tree, config);
    let target = EventTarget::Element(container);

    let seen: Rc<RefCell<Vec<Event>>> = Rc::new(RefCell::new(Vec::new()));
    for kind in SnapEventKind::ALL {
        let sink = seen.clone();
        runtime.add_event_listener(target, kind.event_type(), ListenerOptions::default(), move |e| {
            sink.borrow_mut().push(e.clone())
        });
    }

    let mut steps: Vec<&Step> = scene.steps.iter().collect();
    steps.sort_by_key(|step| step.at_ms);

    let mut last = Duration::ZERO;
    for step in steps {
        last = Duration::from_millis(step.at_ms);
        runtime.advance_time(last);
        debug!("step at {:?}", last);

        if !step.touch_start.is_empty() {
            runtime.touch_start(&pointers(&step.touch_start));
        }
        if step.moves() {
            let current = runtime
                .provider()
                .scroll_metrics(container)
                .map_or(Point::ZERO, |metrics| metrics.offset());
            let offset = Point::new(
                step.scroll_left.unwrap_or(current.x),
                step.scroll_top.unwrap_or(current.y),
            );
            runtime.provider_mut().set_scroll_offset(container, offset);
            runtime.scroll(target);
        }
        if !step.touch_end.is_empty() {
            runtime.touch_end(&pointers(&step.touch_end));
        }
        if step.scroll_end {
            runtime.scroll_end(target);
        }
    }

    runtime.advance_time(last + quiet_period);
    if runtime.pending_timers() > 0 {
        warn!("a pointer is still down at the end of the session; settle never fired");
    }

    let tree = runtime.provider();
    let name = |id: Option<ElementId>| id.and_then(|id| tree.name(id)).map(str::to_string);
    let notifications = seen
        .borrow()
        .iter()
        .filter_map(|event| {
            Some(Notification {
                at: event.time_stamp,
                kind: SnapEventKind::from_event_type(&event.event_type)?,
                block: name(event.snap_target_block),
                inline: name(event.snap_target_inline),
            })
        })
        .collect();
    Ok(notifications)
}
