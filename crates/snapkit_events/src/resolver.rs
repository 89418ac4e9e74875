//! Snap target resolution
//!
//! Picks the descendant a container is snapped to (or will snap to) along one
//! axis by pure geometry: every descendant with a snap alignment is scored by
//! the distance between its snap edge and the container's snap edge, and the
//! closest one wins.
//!
//! ```text
//! container client rect      candidate snap box
//! ┌───────────────┐          ┌─────┐
//! │←pad→|         │   start  │←mar→|          distance = |container edge - candidate edge|
//! └───────────────┘          └─────┘
//! ```
//!
//! Scroll-padding and positive scroll-margin do not take effect on the side
//! where the container already sits at its scroll boundary, so they are
//! ignored there. Negative scroll-margin always applies.

use snapkit_core::{
    Edges, ElementId, LogicalAxis, PhysicalAxis, Rect, ResolverConfig, ScrollMetrics,
    SnapAlignKeyword, StyleAndGeometryProvider, WritingMode,
};

/// A rect or edge set projected onto one physical axis
#[derive(Clone, Copy, Debug, PartialEq)]
struct Span {
    start: f32,
    end: f32,
}

impl Span {
    fn of_rect(rect: &Rect, axis: PhysicalAxis) -> Self {
        match axis {
            PhysicalAxis::X => Span {
                start: rect.left(),
                end: rect.right(),
            },
            PhysicalAxis::Y => Span {
                start: rect.top(),
                end: rect.bottom(),
            },
        }
    }

    fn of_edges(edges: &Edges, axis: PhysicalAxis) -> Self {
        match axis {
            PhysicalAxis::X => Span {
                start: edges.left,
                end: edges.right,
            },
            PhysicalAxis::Y => Span {
                start: edges.top,
                end: edges.bottom,
            },
        }
    }

    fn center(&self) -> f32 {
        self.start + (self.end - self.start) / 2.0
    }

    /// Both edges lie past the same side of `outer`
    fn outside(&self, outer: &Span) -> bool {
        self.end < outer.start || self.start > outer.end
    }
}

fn other_axis(axis: PhysicalAxis) -> PhysicalAxis {
    match axis {
        PhysicalAxis::X => PhysicalAxis::Y,
        PhysicalAxis::Y => PhysicalAxis::X,
    }
}

/// Whether the container sits at either end of its scroll range on one axis
#[derive(Clone, Copy, Debug)]
struct Boundary {
    at_start: bool,
    at_end: bool,
}

/// Geometry-based snap target resolver
#[derive(Clone, Copy, Debug)]
pub struct SnapTargetResolver {
    epsilon: f32,
}

impl Default for SnapTargetResolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl SnapTargetResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            epsilon: config.edge_epsilon,
        }
    }

    /// Snap target along a logical axis of the container
    pub fn resolve<P>(&self, provider: &P, container: ElementId, axis: LogicalAxis) -> Option<ElementId>
    where
        P: StyleAndGeometryProvider + ?Sized,
    {
        let writing_mode = provider.style(container)?.writing_mode;
        self.resolve_physical(provider, container, writing_mode.physical_axis(axis))
    }

    /// Snap target along a physical axis of the container
    pub fn resolve_physical<P>(
        &self,
        provider: &P,
        container: ElementId,
        axis: PhysicalAxis,
    ) -> Option<ElementId>
    where
        P: StyleAndGeometryProvider + ?Sized,
    {
        let container_style = provider.style(container)?;
        if !container_style
            .scroll_snap_type
            .physical_axes(container_style.writing_mode)
            .includes(axis)
        {
            return None;
        }

        let client = provider.bounding_rect(container)?.deflate(container_style.border);
        let metrics = provider.scroll_metrics(container)?;
        let boundary = self.boundary(&metrics, axis);
        let padding = Span::of_edges(&container_style.scroll_padding, axis);
        let writing_mode = container_style.writing_mode;

        let mut snapped = None;
        let mut min_distance = f32::INFINITY;

        for candidate in provider.descendants(container) {
            let Some(style) = provider.style(candidate) else {
                continue;
            };
            let align = style.scroll_snap_align.physical(axis, writing_mode);
            if align == SnapAlignKeyword::None {
                continue;
            }
            let Some(rect) = provider.bounding_rect(candidate) else {
                continue;
            };

            let margin = Span::of_edges(&style.scroll_margin, axis);
            if self.not_contained(&client, &rect, margin, axis, boundary) {
                tracing::trace!("snap candidate {:?} outside container on {:?}", candidate, axis);
                continue;
            }

            let distance = snap_distance(
                align,
                Span::of_rect(&client, axis),
                Span::of_rect(&rect, axis),
                padding,
                margin,
                boundary,
            );
            if distance < min_distance {
                min_distance = distance;
                snapped = Some(candidate);
            }
        }

        tracing::trace!(
            "resolved {:?} snap target of {:?}: {:?} (distance {})",
            axis,
            container,
            snapped,
            min_distance
        );
        snapped
    }

    fn boundary(&self, metrics: &ScrollMetrics, axis: PhysicalAxis) -> Boundary {
        let (offset, max) = match axis {
            PhysicalAxis::X => (metrics.scroll_left, metrics.max_scroll_left()),
            PhysicalAxis::Y => (metrics.scroll_top, metrics.max_scroll_top()),
        };
        Boundary {
            at_start: offset < self.epsilon,
            at_end: offset > max - self.epsilon,
        }
    }

    /// The candidate's snap box lies entirely past one side of the client rect
    ///
    /// Scroll-margin grows the box along the resolution axis only, and not on
    /// a side where the container sits at its scroll boundary.
    fn not_contained(
        &self,
        client: &Rect,
        rect: &Rect,
        margin: Span,
        axis: PhysicalAxis,
        boundary: Boundary,
    ) -> bool {
        let along = Span::of_rect(rect, axis);
        let snap_box = Span {
            start: along.start - if boundary.at_start { 0.0 } else { margin.start },
            end: along.end + if boundary.at_end { 0.0 } else { margin.end },
        };
        let across = other_axis(axis);

        snap_box.outside(&Span::of_rect(client, axis))
            || Span::of_rect(rect, across).outside(&Span::of_rect(client, across))
    }
}

fn snap_distance(
    align: SnapAlignKeyword,
    container: Span,
    candidate: Span,
    padding: Span,
    margin: Span,
    boundary: Boundary,
) -> f32 {
    match align {
        SnapAlignKeyword::Start => {
            let container_edge =
                container.start + if boundary.at_start { 0.0 } else { padding.start };
            let margin = if margin.start < 0.0 || !boundary.at_start {
                margin.start
            } else {
                0.0
            };
            (container_edge - (candidate.start - margin)).abs()
        }
        SnapAlignKeyword::End => {
            let container_edge = container.end - if boundary.at_end { 0.0 } else { padding.end };
            let margin = if margin.end < 0.0 || !boundary.at_end {
                margin.end
            } else {
                0.0
            };
            (container_edge - (candidate.end + margin)).abs()
        }
        SnapAlignKeyword::Center => (container.center() - candidate.center()).abs(),
        SnapAlignKeyword::None | SnapAlignKeyword::Invalid => f32::INFINITY,
    }
}

/// Snap target on the physical y axis, with default resolver settings
pub fn get_snap_target_vertical<P>(provider: &P, container: ElementId) -> Option<ElementId>
where
    P: StyleAndGeometryProvider + ?Sized,
{
    SnapTargetResolver::default().resolve_physical(provider, container, PhysicalAxis::Y)
}

/// Snap target on the physical x axis, with default resolver settings
pub fn get_snap_target_horizontal<P>(provider: &P, container: ElementId) -> Option<ElementId>
where
    P: StyleAndGeometryProvider + ?Sized,
{
    SnapTargetResolver::default().resolve_physical(provider, container, PhysicalAxis::X)
}

/// Writing mode of a container, `horizontal-tb` if it cannot be read
pub(crate) fn writing_mode_of<P>(provider: &P, container: ElementId) -> WritingMode
where
    P: StyleAndGeometryProvider + ?Sized,
{
    provider
        .style(container)
        .map(|s| s.writing_mode)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapkit_core::{Point, SnapAlign, SnapStyle, SnapTree, SnapType};

    /// Horizontal carousel: 200 wide, slides of 200 at x = 0, 200, 400
    fn carousel(align: &str) -> (SnapTree, ElementId, Vec<ElementId>) {
        let mut tree = SnapTree::new();
        let root = tree.create_root(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            SnapStyle::container(SnapType::X),
        );
        let slides = (0..3)
            .map(|i| {
                tree.append_child(
                    root,
                    Rect::new(i as f32 * 200.0, 0.0, 200.0, 100.0),
                    SnapStyle::aligned(SnapAlign::parse(align)),
                )
                .unwrap()
            })
            .collect();
        (tree, root, slides)
    }

    #[test]
    fn test_start_aligned_carousel() {
        let (mut tree, root, slides) = carousel("start");
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[0]));

        tree.set_scroll_offset(root, Point::new(205.0, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[1]));

        tree.set_scroll_offset(root, Point::new(400.0, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[2]));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let (mut tree, root, _) = carousel("center");
        tree.set_scroll_offset(root, Point::new(130.0, 0.0));
        let first = get_snap_target_horizontal(&tree, root);
        for _ in 0..5 {
            assert_eq!(get_snap_target_horizontal(&tree, root), first);
        }
    }

    #[test]
    fn test_axis_excluded_by_snap_type() {
        let (tree, root, _) = carousel("start");
        let resolver = SnapTargetResolver::default();
        assert_eq!(resolver.resolve(&tree, root, LogicalAxis::Block), None);
        assert_eq!(get_snap_target_vertical(&tree, root), None);
        assert!(resolver.resolve(&tree, root, LogicalAxis::Inline).is_some());
    }

    #[test]
    fn test_no_aligned_descendants_resolves_none() {
        let (mut tree, root, slides) = carousel("none");
        tree.set_style(root, SnapStyle::container(SnapType::Both));
        assert_eq!(get_snap_target_horizontal(&tree, root), None);
        assert_eq!(get_snap_target_vertical(&tree, root), None);

        let empty = tree.append_child(slides[0], Rect::ZERO, SnapStyle::container(SnapType::Both));
        assert_eq!(get_snap_target_horizontal(&tree, empty.unwrap()), None);
    }

    #[test]
    fn test_tie_goes_to_document_order() {
        let mut tree = SnapTree::new();
        let root = tree.create_root(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            SnapStyle::container(SnapType::X),
        );
        let first = tree
            .append_child(
                root,
                Rect::new(0.0, 0.0, 100.0, 100.0),
                SnapStyle::aligned(SnapAlign::parse("start")),
            )
            .unwrap();
        let second = tree
            .append_child(
                root,
                Rect::new(0.0, 0.0, 150.0, 100.0),
                SnapStyle::aligned(SnapAlign::parse("start")),
            )
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(first));
    }

    #[test]
    fn test_malformed_alignment_never_wins() {
        let (tree, root, slides) = carousel("middle");
        assert_eq!(get_snap_target_horizontal(&tree, root), None);
        assert_eq!(slides.len(), 3);
    }

    #[test]
    fn test_end_alignment_uses_end_edges() {
        let (mut tree, root, slides) = carousel("end");
        tree.set_scroll_offset(root, Point::new(198.0, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[1]));
    }

    #[test]
    fn test_scroll_padding_ignored_at_start_boundary() {
        let (mut tree, root, slides) = carousel("start");
        tree.set_style(
            root,
            SnapStyle::container(SnapType::X).with_scroll_padding(Edges::new(0.0, 0.0, 0.0, 20.0)),
        );
        // at offset 0 the padding cannot take effect: slide 0 sits exactly at the edge
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[0]));

        // away from the boundary the padded edge is what slides align to
        tree.set_scroll_offset(root, Point::new(180.0, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[1]));
    }

    #[test]
    fn test_negative_margin_applies_at_boundary() {
        let mut tree = SnapTree::new();
        let root = tree.create_root(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            SnapStyle::container(SnapType::X),
        );
        let inset = tree
            .append_child(
                root,
                Rect::new(0.0, 0.0, 100.0, 100.0),
                SnapStyle::aligned(SnapAlign::parse("start"))
                    .with_scroll_margin(Edges::new(0.0, 0.0, 0.0, -10.0)),
            )
            .unwrap();
        let plain = tree
            .append_child(
                root,
                Rect::new(5.0, 0.0, 100.0, 100.0),
                SnapStyle::aligned(SnapAlign::parse("start")),
            )
            .unwrap();
        tree.append_child(root, Rect::new(0.0, 0.0, 600.0, 10.0), SnapStyle::default())
            .unwrap();
        // at offset 0 the negative margin still insets `inset` by 10, so `plain` is closer
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(plain));
        assert_ne!(inset, plain);
    }

    #[test]
    fn test_positive_margin_ignored_at_boundary() {
        let mut tree = SnapTree::new();
        let root = tree.create_root(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            SnapStyle::container(SnapType::X),
        );
        let outset = tree
            .append_child(
                root,
                Rect::new(0.0, 0.0, 100.0, 100.0),
                SnapStyle::aligned(SnapAlign::parse("start"))
                    .with_scroll_margin(Edges::new(0.0, 0.0, 0.0, 10.0)),
            )
            .unwrap();
        tree.append_child(
            root,
            Rect::new(5.0, 0.0, 100.0, 100.0),
            SnapStyle::aligned(SnapAlign::parse("start")),
        )
        .unwrap();
        tree.append_child(root, Rect::new(0.0, 0.0, 600.0, 10.0), SnapStyle::default())
            .unwrap();
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(outset));
    }

    #[test]
    fn test_vertical_writing_mode_maps_block_to_x() {
        let (mut tree, root, slides) = carousel("start");
        tree.set_style(
            root,
            SnapStyle::container(SnapType::Block).with_writing_mode(WritingMode::VerticalRl),
        );
        tree.set_scroll_offset(root, Point::new(200.0, 0.0));
        let resolver = SnapTargetResolver::default();
        assert_eq!(
            resolver.resolve(&tree, root, LogicalAxis::Block),
            Some(slides[1])
        );
        assert_eq!(resolver.resolve(&tree, root, LogicalAxis::Inline), None);
    }

    #[test]
    fn test_border_is_excluded_from_client_rect() {
        let (mut tree, root, slides) = carousel("start");
        tree.set_style(
            root,
            SnapStyle::container(SnapType::X).with_border(Edges::all(4.0)),
        );
        tree.set_scroll_offset(root, Point::new(210.0, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[1]));
    }

    /// 200 wide, scrolls to 400; snap children are 100 wide at the given x
    fn strip(
        container: SnapStyle,
        children: &[(f32, SnapStyle)],
    ) -> (SnapTree, ElementId, Vec<ElementId>) {
        let mut tree = SnapTree::new();
        let root = tree.create_root(Rect::new(0.0, 0.0, 200.0, 100.0), container);
        let ids = children
            .iter()
            .map(|(x, style)| {
                tree.append_child(root, Rect::new(*x, 0.0, 100.0, 100.0), *style)
                    .unwrap()
            })
            .collect();
        tree.append_child(root, Rect::new(0.0, 0.0, 600.0, 10.0), SnapStyle::default())
            .unwrap();
        (tree, root, ids)
    }

    fn padded_start() -> (SnapTree, ElementId, Vec<ElementId>) {
        let start = SnapStyle::aligned(SnapAlign::parse("start"));
        strip(
            SnapStyle::container(SnapType::X).with_scroll_padding(Edges::new(0.0, 0.0, 0.0, 20.0)),
            &[(0.0, start), (20.0, start)],
        )
    }

    #[test]
    fn test_start_padding_within_edge_epsilon() {
        let (mut tree, root, slides) = padded_start();

        tree.set_scroll_offset(root, Point::new(1.5, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[0]));

        tree.set_scroll_offset(root, Point::new(2.5, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[1]));
    }

    #[test]
    fn test_end_padding_ignored_near_max_offset() {
        let end = SnapStyle::aligned(SnapAlign::parse("end"));
        let (mut tree, root, slides) = strip(
            SnapStyle::container(SnapType::X).with_scroll_padding(Edges::new(0.0, 20.0, 0.0, 0.0)),
            &[(500.0, end), (480.0, end)],
        );

        // within 2 of max: the padded end edge does not apply
        tree.set_scroll_offset(root, Point::new(398.5, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[0]));

        tree.set_scroll_offset(root, Point::new(397.5, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[1]));
    }

    #[test]
    fn test_positive_end_margin_ignored_near_max_offset() {
        let end = SnapStyle::aligned(SnapAlign::parse("end"));
        let (mut tree, root, slides) = strip(
            SnapStyle::container(SnapType::X),
            &[
                (500.0, end.with_scroll_margin(Edges::new(0.0, 10.0, 0.0, 0.0))),
                (495.0, end),
            ],
        );

        tree.set_scroll_offset(root, Point::new(398.5, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[0]));

        tree.set_scroll_offset(root, Point::new(397.5, 0.0));
        assert_eq!(get_snap_target_horizontal(&tree, root), Some(slides[1]));
    }

    #[test]
    fn test_configured_edge_epsilon() {
        let (mut tree, root, slides) = padded_start();
        tree.set_scroll_offset(root, Point::new(2.5, 0.0));

        let loose = SnapTargetResolver::new(ResolverConfig { edge_epsilon: 5.0 });
        assert_eq!(
            loose.resolve_physical(&tree, root, PhysicalAxis::X),
            Some(slides[0])
        );

        let exact = SnapTargetResolver::new(ResolverConfig { edge_epsilon: 0.0 });
        tree.set_scroll_offset(root, Point::new(1.5, 0.0));
        assert_eq!(
            exact.resolve_physical(&tree, root, PhysicalAxis::X),
            Some(slides[1])
        );
    }
}
