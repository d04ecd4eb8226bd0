use serde::Serialize;

use crate::models::{Course, MetricKind};

/// Length of the lap that velocity formulas are expressed over.
pub const LAP_LENGTH: u32 = 25;

/// Which manual fields an operator is expected to fill in for a segment.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityFlags {
    pub has_split15: bool,
    pub has_split25: bool,
    pub has_segment_time: bool,
    pub has_stroke_count: bool,
    pub has_underwater_distance: bool,
}

impl CapabilityFlags {
    /// Segment time, stroke count and underwater distance. Every segment has these.
    pub const fn timed() -> Self {
        Self {
            has_split15: false,
            has_split25: false,
            has_segment_time: true,
            has_stroke_count: true,
            has_underwater_distance: true,
        }
    }

    pub const fn with_split15(mut self) -> Self {
        self.has_split15 = true;
        self
    }

    pub const fn with_split25(mut self) -> Self {
        self.has_split25 = true;
        self
    }

    /// Whether a measurement of `kind` may be attached to a segment with these flags.
    /// Whole-test kinds are never segment-scoped.
    pub fn allows(&self, kind: MetricKind) -> bool {
        match kind {
            MetricKind::T15 => self.has_split15,
            MetricKind::T25 => self.has_split25,
            MetricKind::SegmentTime => self.has_segment_time,
            MetricKind::StrokeCount => self.has_stroke_count,
            MetricKind::UnderwaterDistance => self.has_underwater_distance,
            MetricKind::TotalTime | MetricKind::TotalStrokes => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// 1-based position within the test.
    pub index: u32,
    pub start: u32,
    pub length: u32,
    pub label: String,
    pub capability_flags: CapabilityFlags,
}

impl Segment {
    pub(crate) fn new(index: u32, start: u32, length: u32, capability_flags: CapabilityFlags) -> Self {
        Self {
            index,
            start,
            length,
            label: format!("{}-{}m", start, start + length),
            capability_flags,
        }
    }

    pub fn end(&self) -> u32 {
        self.start + self.length
    }

    /// 1-based index of the first 25m lap this segment covers.
    pub fn first_lap(&self) -> u32 {
        self.start / LAP_LENGTH + 1
    }

    /// Number of 25m laps whose time can be read off this segment's measurements.
    ///
    /// A segment with a 25m checkpoint yields its two halves. Otherwise only a
    /// segment that is itself one lap long yields a lap time.
    pub fn lap_slots(&self) -> u32 {
        if self.capability_flags.has_split25 {
            self.length / LAP_LENGTH
        } else if self.length == LAP_LENGTH && self.capability_flags.has_segment_time {
            1
        } else {
            0
        }
    }
}

/// Ordered segments for one (distance, course) pair.
///
/// Always recomputed from its inputs and never mutated after resolution.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPlan {
    pub distance: u32,
    pub course: Course,
    pub segments: Vec<Segment>,
    /// Distances in meters where an intermediate time is also expected.
    pub global_split_markers: Vec<u32>,
    /// Name of the topology rule that produced the plan, `None` when unsupported.
    pub rule: Option<&'static str>,
}

impl SegmentPlan {
    pub fn unsupported(distance: u32, course: Course) -> Self {
        Self {
            distance,
            course,
            segments: Vec::new(),
            global_split_markers: Vec::new(),
            rule: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_supported(&self) -> bool {
        !self.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Sum of segment lengths. Equals `distance` for every supported plan.
    pub fn total_length(&self) -> u32 {
        self.segments.iter().map(|s| s.length).sum()
    }

    pub fn segment(&self, index: u32) -> Option<&Segment> {
        if index == 0 {
            return None;
        }
        self.segments.get(index as usize - 1)
    }

    pub fn lap_slots(&self) -> u32 {
        self.segments.iter().map(Segment::lap_slots).sum()
    }

    pub fn global_split_labels(&self) -> Vec<String> {
        self.global_split_markers
            .iter()
            .map(|m| format!("{m}m"))
            .collect()
    }

    /// User-facing explanation for an empty plan.
    pub fn unsupported_message(&self) -> String {
        format!(
            "{}m is not a supported distance for {} course (must be a multiple of {}m)",
            self.distance,
            self.course,
            self.course.pool_length()
        )
    }
}
