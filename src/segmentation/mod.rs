pub mod algorithm;
pub mod plan;
pub mod rules;

pub use algorithm::resolve;
pub use plan::{CapabilityFlags, Segment, SegmentPlan, LAP_LENGTH};
