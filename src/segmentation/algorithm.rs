use crate::log_info;
use crate::models::Course;
use crate::segmentation::plan::{Segment, SegmentPlan};
use crate::segmentation::rules::{find_rule, generic_layout, Layout, GENERIC_RULE};

const ENABLE_LOGS: bool = false;

/// Resolve the segment topology for a test.
///
/// Never fails: an unsupported (distance, course) pair yields an empty plan,
/// which callers must surface as an unsupported configuration.
pub fn resolve(distance: u32, course: Course) -> SegmentPlan {
    let (rule, layout) = match find_rule(distance, course) {
        Some(rule) => (rule.name, (rule.layout)(distance, course)),
        None => match generic_layout(distance, course) {
            Some(layout) => (GENERIC_RULE, layout),
            None => {
                log_info!("No topology for {}m {} course", distance, course);
                return SegmentPlan::unsupported(distance, course);
            }
        },
    };

    let plan = build_plan(distance, course, rule, layout);
    log::debug!(
        "Resolved {}m {} course via {}: {} segments, {} global splits",
        distance,
        course,
        rule,
        plan.segments.len(),
        plan.global_split_markers.len()
    );
    plan
}

fn build_plan(distance: u32, course: Course, rule: &'static str, layout: Layout) -> SegmentPlan {
    let count = distance / layout.segment_length;
    let segments = (0..count)
        .map(|i| {
            Segment::new(
                i + 1,
                i * layout.segment_length,
                layout.segment_length,
                layout.flags,
            )
        })
        .collect();

    SegmentPlan {
        distance,
        course,
        segments,
        global_split_markers: layout.markers,
        rule: Some(rule),
    }
}
