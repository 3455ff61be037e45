// ============================================================================
// edges.rs - driftfield
// Proximity graph: all-pairs scan for particles closer than the link threshold.
// ============================================================================

use glam::Vec3;

/// A proximity link between particles `a < b`, with both endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub start: Vec3,
    pub end: Vec3,
}

/// Every unordered pair whose Euclidean distance is strictly below `threshold`.
///
/// O(n²) by choice: at a few hundred particles the scan fits in a frame and
/// needs no acceleration structure. The result is rebuilt from scratch on
/// every call.
pub fn build_edges(positions: &[Vec3], threshold: f32) -> Vec<Edge> {
    let mut edges = Vec::new();
    if !(threshold > 0.0) {
        return edges;
    }
    let limit = threshold * threshold;

    for (a, &start) in positions.iter().enumerate() {
        for (b, &end) in positions.iter().enumerate().skip(a + 1) {
            if start.distance_squared(end) < limit {
                edges.push(Edge { a, b, start, end });
            }
        }
    }
    edges
}

/// Flatten edges into the endpoint list drawn as a line list.
pub fn line_vertices(edges: &[Edge]) -> Vec<Vec3> {
    let mut vertices = Vec::with_capacity(edges.len() * 2);
    for edge in edges {
        vertices.push(edge.start);
        vertices.push(edge.end);
    }
    vertices
}
