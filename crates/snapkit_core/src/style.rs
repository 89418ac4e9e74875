//! Computed snap style
//!
//! The subset of computed style the resolver reads: `scroll-snap-type`,
//! `scroll-snap-align`, `writing-mode`, scroll-margin, scroll-padding and
//! border widths. Values parse from CSS text so scenes and hosts can hand
//! over exactly what a style engine would report.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StyleParseError;
use crate::geometry::Edges;

/// A physical scrolling direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalAxis {
    X,
    Y,
}

/// A logical scrolling direction, mapped to physical by writing mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalAxis {
    Block,
    Inline,
}

/// `writing-mode`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WritingMode {
    #[default]
    HorizontalTb,
    VerticalRl,
    VerticalLr,
    SidewaysRl,
    SidewaysLr,
}

impl WritingMode {
    /// Only `horizontal-tb` lays out inline along x
    pub fn is_horizontal(self) -> bool {
        matches!(self, WritingMode::HorizontalTb)
    }

    /// Map a logical axis to the physical axis it runs along
    pub fn physical_axis(self, axis: LogicalAxis) -> PhysicalAxis {
        match (self.is_horizontal(), axis) {
            (true, LogicalAxis::Inline) | (false, LogicalAxis::Block) => PhysicalAxis::X,
            (true, LogicalAxis::Block) | (false, LogicalAxis::Inline) => PhysicalAxis::Y,
        }
    }

    /// Map a physical axis back to the logical axis it carries
    pub fn logical_axis(self, axis: PhysicalAxis) -> LogicalAxis {
        match (self.is_horizontal(), axis) {
            (true, PhysicalAxis::X) | (false, PhysicalAxis::Y) => LogicalAxis::Inline,
            (true, PhysicalAxis::Y) | (false, PhysicalAxis::X) => LogicalAxis::Block,
        }
    }
}

impl FromStr for WritingMode {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "horizontal-tb" => Ok(WritingMode::HorizontalTb),
            "vertical-rl" => Ok(WritingMode::VerticalRl),
            "vertical-lr" => Ok(WritingMode::VerticalLr),
            "sideways-rl" => Ok(WritingMode::SidewaysRl),
            "sideways-lr" => Ok(WritingMode::SidewaysLr),
            other => Err(StyleParseError::WritingMode(other.to_string())),
        }
    }
}

impl fmt::Display for WritingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WritingMode::HorizontalTb => "horizontal-tb",
            WritingMode::VerticalRl => "vertical-rl",
            WritingMode::VerticalLr => "vertical-lr",
            WritingMode::SidewaysRl => "sideways-rl",
            WritingMode::SidewaysLr => "sideways-lr",
        })
    }
}

/// The axis part of `scroll-snap-type` (strictness is irrelevant here)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapType {
    #[default]
    None,
    X,
    Y,
    Both,
    Block,
    Inline,
}

/// Physical axes a container snaps on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhysicalSnapAxes {
    None,
    X,
    Y,
    Both,
}

impl PhysicalSnapAxes {
    pub fn includes(self, axis: PhysicalAxis) -> bool {
        match self {
            PhysicalSnapAxes::None => false,
            PhysicalSnapAxes::Both => true,
            PhysicalSnapAxes::X => axis == PhysicalAxis::X,
            PhysicalSnapAxes::Y => axis == PhysicalAxis::Y,
        }
    }
}

impl SnapType {
    /// Resolve logical snap types against the container's writing mode
    pub fn physical_axes(self, writing_mode: WritingMode) -> PhysicalSnapAxes {
        let from_axis = |axis| match axis {
            PhysicalAxis::X => PhysicalSnapAxes::X,
            PhysicalAxis::Y => PhysicalSnapAxes::Y,
        };
        match self {
            SnapType::None => PhysicalSnapAxes::None,
            SnapType::X => PhysicalSnapAxes::X,
            SnapType::Y => PhysicalSnapAxes::Y,
            SnapType::Both => PhysicalSnapAxes::Both,
            SnapType::Block => from_axis(writing_mode.physical_axis(LogicalAxis::Block)),
            SnapType::Inline => from_axis(writing_mode.physical_axis(LogicalAxis::Inline)),
        }
    }
}

impl FromStr for SnapType {
    type Err = StyleParseError;

    /// Parses `"x mandatory"`, `"both proximity"`, `"none"`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let axis = s.split_whitespace().next().unwrap_or("none");
        match axis {
            "none" => Ok(SnapType::None),
            "x" => Ok(SnapType::X),
            "y" => Ok(SnapType::Y),
            "both" => Ok(SnapType::Both),
            "block" => Ok(SnapType::Block),
            "inline" => Ok(SnapType::Inline),
            other => Err(StyleParseError::SnapType(other.to_string())),
        }
    }
}

/// One `scroll-snap-align` keyword
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapAlignKeyword {
    #[default]
    None,
    Start,
    Center,
    End,
    /// Anything unrecognised; participates but can never win
    Invalid,
}

impl SnapAlignKeyword {
    fn parse(s: &str) -> Self {
        match s {
            "none" => SnapAlignKeyword::None,
            "start" => SnapAlignKeyword::Start,
            "center" => SnapAlignKeyword::Center,
            "end" => SnapAlignKeyword::End,
            _ => SnapAlignKeyword::Invalid,
        }
    }
}

/// `scroll-snap-align`, one keyword per logical axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapAlign {
    pub block: SnapAlignKeyword,
    pub inline: SnapAlignKeyword,
}

impl SnapAlign {
    pub const NONE: SnapAlign = SnapAlign::uniform(SnapAlignKeyword::None);

    pub const fn uniform(keyword: SnapAlignKeyword) -> Self {
        Self {
            block: keyword,
            inline: keyword,
        }
    }

    /// Parse `"start"` or `"<block> <inline>"`.
    ///
    /// Never fails: unrecognised input yields [`SnapAlignKeyword::Invalid`].
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (None, _, _) => SnapAlign::NONE,
            (Some(one), None, _) => SnapAlign::uniform(SnapAlignKeyword::parse(one)),
            (Some(block), Some(inline), None) => SnapAlign {
                block: SnapAlignKeyword::parse(block),
                inline: SnapAlignKeyword::parse(inline),
            },
            _ => SnapAlign::uniform(SnapAlignKeyword::Invalid),
        }
    }

    pub fn logical(&self, axis: LogicalAxis) -> SnapAlignKeyword {
        match axis {
            LogicalAxis::Block => self.block,
            LogicalAxis::Inline => self.inline,
        }
    }

    /// The keyword that applies along a physical axis under `writing_mode`
    pub fn physical(&self, axis: PhysicalAxis, writing_mode: WritingMode) -> SnapAlignKeyword {
        self.logical(writing_mode.logical_axis(axis))
    }
}

/// Parse a CSS length as the resolver needs it: `auto` reads as 0
pub fn parse_length(s: &str) -> Result<f32, StyleParseError> {
    let s = s.trim();
    if s == "auto" {
        return Ok(0.0);
    }
    let number = s.strip_suffix("px").unwrap_or(s);
    number
        .trim()
        .parse::<f32>()
        .map_err(|_| StyleParseError::Length(s.to_string()))
}

/// Parse a 1–4 value box shorthand (`top right bottom left` order)
pub fn parse_edges(s: &str) -> Result<Edges, StyleParseError> {
    let values = s
        .split_whitespace()
        .map(parse_length)
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        [] => Ok(Edges::ZERO),
        [all] => Ok(Edges::all(*all)),
        [v, h] => Ok(Edges::new(*v, *h, *v, *h)),
        [t, h, b] => Ok(Edges::new(*t, *h, *b, *h)),
        [t, r, b, l] => Ok(Edges::new(*t, *r, *b, *l)),
        _ => Err(StyleParseError::Edges(s.to_string())),
    }
}

/// Computed style of one element, as far as snapping is concerned
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapStyle {
    pub scroll_snap_type: SnapType,
    pub scroll_snap_align: SnapAlign,
    pub writing_mode: WritingMode,
    pub scroll_margin: Edges,
    pub scroll_padding: Edges,
    pub border: Edges,
}

impl SnapStyle {
    /// Style of a snapping container
    pub fn container(snap_type: SnapType) -> Self {
        Self {
            scroll_snap_type: snap_type,
            ..Default::default()
        }
    }

    /// Style of a snap candidate
    pub fn aligned(align: SnapAlign) -> Self {
        Self {
            scroll_snap_align: align,
            ..Default::default()
        }
    }

    pub fn with_writing_mode(mut self, writing_mode: WritingMode) -> Self {
        self.writing_mode = writing_mode;
        self
    }

    pub fn with_scroll_margin(mut self, margin: Edges) -> Self {
        self.scroll_margin = margin;
        self
    }

    pub fn with_scroll_padding(mut self, padding: Edges) -> Self {
        self.scroll_padding = padding;
        self
    }

    pub fn with_border(mut self, border: Edges) -> Self {
        self.border = border;
        self
    }

    /// Parse declarations such as `scroll-snap-type: x mandatory; border-width: 2px`
    ///
    /// Properties that do not affect snapping are skipped.
    pub fn from_css(css: &str) -> Result<Self, StyleParseError> {
        let mut style = SnapStyle::default();
        for declaration in css.split(';').map(str::trim).filter(|d| !d.is_empty()) {
            let (property, value) = declaration
                .split_once(':')
                .ok_or_else(|| StyleParseError::Declaration(declaration.to_string()))?;
            let value = value.trim();
            match property.trim() {
                "scroll-snap-type" => style.scroll_snap_type = value.parse()?,
                "scroll-snap-align" => style.scroll_snap_align = SnapAlign::parse(value),
                "writing-mode" => style.writing_mode = value.parse()?,
                "scroll-margin" => style.scroll_margin = parse_edges(value)?,
                "scroll-padding" => style.scroll_padding = parse_edges(value)?,
                "border-width" => style.border = parse_edges(value)?,
                longhand => {
                    let Some((shorthand, side)) = longhand.rsplit_once('-') else {
                        continue;
                    };
                    let edges = match shorthand {
                        "scroll-margin" => &mut style.scroll_margin,
                        "scroll-padding" => &mut style.scroll_padding,
                        _ => continue,
                    };
                    let length = parse_length(value)?;
                    match side {
                        "top" => edges.top = length,
                        "right" => edges.right = length,
                        "bottom" => edges.bottom = length,
                        "left" => edges.left = length,
                        _ => {}
                    }
                }
            }
        }
        Ok(style)
    }
}
