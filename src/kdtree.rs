//! Balanced KD-tree over packed RGB palette colors for nearest-color lookup.

use crate::error::QuantizeError;
use crate::pixel::{blue, green, red};

#[derive(Debug, Clone, Copy)]
struct Node {
    /// Index into the palette.
    index: usize,
    /// 0 = R, 1 = G, 2 = B.
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// KD-tree built once over a palette of packed `0x??RRGGBB` colors.
///
/// Nodes live in an arena; the splitting axis cycles R, G, B with depth and
/// each level splits at the median of its axis.
#[derive(Debug, Clone)]
pub struct KdTree {
    palette: Vec<u32>,
    nodes: Vec<Node>,
    root: usize,
}

#[inline(always)]
fn channel(color: u32, axis: usize) -> i64 {
    match axis {
        0 => red(color) as i64,
        1 => green(color) as i64,
        _ => blue(color) as i64,
    }
}

#[inline(always)]
fn distance_sq(query: [i64; 3], color: u32) -> i64 {
    let dr = query[0] - red(color) as i64;
    let dg = query[1] - green(color) as i64;
    let db = query[2] - blue(color) as i64;
    dr * dr + dg * dg + db * db
}

impl KdTree {
    /// Build the tree. Fails on an empty palette.
    pub fn new(palette: Vec<u32>) -> Result<Self, QuantizeError> {
        if palette.is_empty() {
            return Err(QuantizeError::EmptyPalette);
        }
        let mut indices: Vec<usize> = (0..palette.len()).collect();
        let mut nodes = Vec::with_capacity(palette.len());
        let root = build(&palette, &mut nodes, &mut indices, 0)
            .ok_or(QuantizeError::EmptyPalette)?;
        Ok(Self {
            palette,
            nodes,
            root,
        })
    }

    pub fn palette(&self) -> &[u32] {
        &self.palette
    }

    /// Index of the palette color closest to `(r, g, b)` in squared Euclidean
    /// distance. Ties go to whichever candidate the search reaches first.
    pub fn nearest(&self, r: u8, g: u8, b: u8) -> usize {
        let query = [r as i64, g as i64, b as i64];
        let root = self.nodes[self.root].index;
        let mut best = (root, distance_sq(query, self.palette[root]));
        self.search(Some(self.root), query, &mut best);
        best.0
    }

    /// The palette color closest to the RGB part of `argb`.
    pub fn nearest_color(&self, argb: u32) -> u32 {
        self.palette[self.nearest(red(argb), green(argb), blue(argb))]
    }

    fn search(&self, node: Option<usize>, query: [i64; 3], best: &mut (usize, i64)) {
        let Some(id) = node else {
            return;
        };
        let node = self.nodes[id];
        let color = self.palette[node.index];

        let d = distance_sq(query, color);
        if d < best.1 {
            *best = (node.index, d);
        }

        let diff = query[node.axis] - channel(color, node.axis);
        let (near, far) = if diff < 0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.search(near, query, best);
        // Only cross the splitting plane if it is closer than the best so far.
        if diff * diff < best.1 {
            self.search(far, query, best);
        }
    }
}

fn build(
    palette: &[u32],
    nodes: &mut Vec<Node>,
    indices: &mut [usize],
    depth: usize,
) -> Option<usize> {
    if indices.is_empty() {
        return None;
    }
    let axis = depth % 3;
    indices.sort_by_key(|&i| channel(palette[i], axis));

    let mid = indices.len() / 2;
    let id = nodes.len();
    nodes.push(Node {
        index: indices[mid],
        axis,
        left: None,
        right: None,
    });

    let (lower, upper) = indices.split_at_mut(mid);
    let left = build(palette, nodes, lower, depth + 1);
    let right = build(palette, nodes, &mut upper[1..], depth + 1);
    nodes[id].left = left;
    nodes[id].right = right;
    Some(id)
}
