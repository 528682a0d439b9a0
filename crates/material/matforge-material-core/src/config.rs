//! Graph editing configuration.

use serde::{Deserialize, Serialize};

/// Defaults applied when nodes and materials are created, plus validation
/// switches. Missing fields deserialize to their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Valid frame range given to new nodes.
    pub node_frame_range: [i32; 2],
    /// Frame range given to new materials.
    pub material_frame_range: [i32; 2],
    /// Reject connections whose slot index exceeds the schema's slot count.
    pub validate_slots: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            node_frame_range: [0, 1],
            material_frame_range: [0, 1],
            validate_slots: true,
        }
    }
}
