use super::tiling::PanelPlacement;
use crate::Point;
use crate::Vector;
use serde::Serialize;

const CORNER_UV: [[f64; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// All panels of a facet merged into one quad list for a single draw call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelBatch {
    pub vertices: Vec<Point>,
    pub normals: Vec<Vector>,
    pub uvs: Vec<[f64; 2]>,
    /// Vertex indices of each panel, counter-clockwise seen from the normal side.
    pub quads: Vec<[usize; 4]>,
}

impl PanelBatch {
    pub fn from_placements(placements: &[PanelPlacement]) -> Self {
        let mut batch = Self {
            vertices: Vec::with_capacity(placements.len() * 4),
            normals: Vec::with_capacity(placements.len() * 4),
            uvs: Vec::with_capacity(placements.len() * 4),
            quads: Vec::with_capacity(placements.len()),
        };
        for p in placements {
            let base = batch.vertices.len();
            let mut corners = p.corners();
            // Keep winding counter-clockwise around the normal
            if p.width_dir.cross(&p.length_dir).dot(&p.normal) < 0.0 {
                corners.swap(1, 3);
            }
            batch.vertices.extend(corners);
            batch.normals.extend([p.normal; 4]);
            batch.uvs.extend(CORNER_UV);
            batch.quads.push([base, base + 1, base + 2, base + 3]);
        }
        batch
    }

    pub fn panel_count(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }
}
