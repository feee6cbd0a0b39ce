//! Left/right clearance analysis
//!
//! Sums how much of each half of the frame is covered by detections and
//! recommends moving toward the emptier half.

use drishti_core::{Detection, Direction, FrameSize};
use serde::{Deserialize, Serialize};

/// Direction recommended when both halves carry the same load. Arbitrary.
pub const TIE_BREAK: Direction = Direction::Left;

/// Per-cycle obstruction summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clearance {
    pub left_area: f32,
    pub right_area: f32,
    pub recommended: Direction,
}

impl Clearance {
    pub fn open() -> Self {
        Self {
            left_area: 0.0,
            right_area: 0.0,
            recommended: TIE_BREAK,
        }
    }
}

pub struct ClearanceAnalyzer;

impl ClearanceAnalyzer {
    /// Analyze all raw detections of a cycle, relevant or not. A box that
    /// straddles the midpoint contributes its overlap with each half.
    pub fn analyze(detections: &[Detection], frame: FrameSize) -> Clearance {
        if frame.is_empty() {
            return Clearance::open();
        }

        let width = frame.width as f32;
        let mid = width / 2.0;
        let mut left_area = 0.0f32;
        let mut right_area = 0.0f32;

        for det in detections {
            let bbox = &det.bbox;
            if !bbox.is_valid() {
                continue;
            }
            let x0 = bbox.x.clamp(0.0, width);
            let x1 = (bbox.x + bbox.width).clamp(0.0, width);
            left_area += (x1.min(mid) - x0).max(0.0) * bbox.height;
            right_area += (x1 - x0.max(mid)).max(0.0) * bbox.height;
        }

        let recommended = if left_area < right_area {
            Direction::Left
        } else if right_area < left_area {
            Direction::Right
        } else {
            TIE_BREAK
        };

        Clearance {
            left_area,
            right_area,
            recommended,
        }
    }
}
