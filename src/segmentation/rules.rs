//! Ordered topology rules.
//!
//! Each rule pairs a predicate on (distance, course) with a layout. Rules are
//! tried in table order and the first match wins. Anything no special case
//! claims falls through to [`generic_layout`].

use crate::models::Course;
use crate::segmentation::plan::{CapabilityFlags, LAP_LENGTH};

/// Reference unit: one long-course pool.
pub const UNIT: u32 = 50;

/// Uniform layout of a plan: every segment has the same length and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub segment_length: u32,
    pub flags: CapabilityFlags,
    pub markers: Vec<u32>,
}

pub struct TopologyRule {
    pub name: &'static str,
    pub matches: fn(u32, Course) -> bool,
    pub layout: fn(u32, Course) -> Layout,
}

pub const GENERIC_RULE: &str = "generic_multiple";

pub static RULES: &[TopologyRule] = &[
    TopologyRule {
        name: "long_50_single",
        matches: |d, c| d == UNIT && c == Course::Long,
        // The whole test is one timed segment with 15m and 25m checkpoints inside it.
        layout: |_, _| Layout {
            segment_length: UNIT,
            flags: CapabilityFlags::timed().with_split15().with_split25(),
            markers: Vec::new(),
        },
    },
    TopologyRule {
        name: "short_50_pair",
        matches: |d, c| d == UNIT && c == Course::Short,
        // Each length's own time is its 25m split.
        layout: |_, _| Layout {
            segment_length: UNIT / 2,
            flags: CapabilityFlags::timed().with_split15(),
            markers: Vec::new(),
        },
    },
    TopologyRule {
        name: "long_100_pair",
        matches: |d, c| d == 2 * UNIT && c == Course::Long,
        layout: |_, _| Layout {
            segment_length: UNIT,
            flags: CapabilityFlags::timed(),
            markers: Vec::new(),
        },
    },
    TopologyRule {
        name: "short_100_quad",
        matches: |d, c| d == 2 * UNIT && c == Course::Short,
        layout: |_, _| Layout {
            segment_length: UNIT / 2,
            flags: CapabilityFlags::timed(),
            markers: Vec::new(),
        },
    },
    TopologyRule {
        name: "short_200_octet",
        matches: |d, c| d == 4 * UNIT && c == Course::Short,
        layout: |d, _| Layout {
            segment_length: UNIT / 2,
            flags: CapabilityFlags::timed(),
            markers: markers_every(UNIT / 2, d),
        },
    },
    TopologyRule {
        name: "long_200_quad",
        matches: |d, c| d == 4 * UNIT && c == Course::Long,
        layout: |_, _| Layout {
            segment_length: UNIT,
            flags: CapabilityFlags::timed(),
            markers: Vec::new(),
        },
    },
];

/// Fallback for distances no special case claims. `None` when the distance is
/// not a positive multiple of the course's pool length.
pub fn generic_layout(distance: u32, course: Course) -> Option<Layout> {
    let unit = course.pool_length();
    if distance == 0 || distance % unit != 0 {
        return None;
    }

    let markers = if course == Course::Short && distance >= 2 * unit {
        markers_every(LAP_LENGTH, distance)
    } else {
        Vec::new()
    };

    Some(Layout {
        segment_length: unit,
        flags: CapabilityFlags::timed(),
        markers,
    })
}

/// Boundaries at `step`, `2*step`, ... strictly before `distance`.
pub fn markers_every(step: u32, distance: u32) -> Vec<u32> {
    (1..)
        .map(|n| n * step)
        .take_while(|m| *m < distance)
        .collect()
}

/// First rule matching the pair, if any special case applies.
pub fn find_rule(distance: u32, course: Course) -> Option<&'static TopologyRule> {
    RULES.iter().find(|rule| (rule.matches)(distance, course))
}
