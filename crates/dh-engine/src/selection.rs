//! Selection reporting.

use dh_core::host::Canvas;
use dh_core::model::{FrameDetails, NodeType};

/// Selected frames, in selection order. Other node types are left out.
pub fn selection_details(canvas: &impl Canvas) -> Vec<FrameDetails> {
    canvas
        .selection()
        .into_iter()
        .filter_map(|id| canvas.node(id))
        .filter(|node| node.node_type == NodeType::Frame)
        .map(|node| FrameDetails::from(&node))
        .collect()
}
