//! Binary space partitioning over triangle soups.
//!
//! Nodes live in a flat arena and every traversal runs off an explicit
//! stack, so deep trees built from large soups cannot overflow the call
//! stack.

use partforge_kernel_tessellate::Triangle;

use crate::split::{split_triangle, Plane};

/// One node: a splitting plane, the triangles lying in it, and the
/// indices of its front and back children.
#[derive(Debug, Clone, Default)]
pub struct BspNode {
    /// Splitting plane, `None` only for an empty root.
    pub plane: Option<Plane>,
    /// Triangles coplanar with `plane`.
    pub triangles: Vec<Triangle>,
    /// Child on the front side.
    pub front: Option<usize>,
    /// Child on the back side.
    pub back: Option<usize>,
}

/// A BSP tree; node 0 is the root.
#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<BspNode>,
}

impl Default for BspTree {
    fn default() -> Self {
        Self {
            nodes: vec![BspNode::default()],
        }
    }
}

impl BspTree {
    /// Build a tree from a soup.
    pub fn new(triangles: &[Triangle]) -> Self {
        let mut tree = Self::default();
        tree.build(triangles.to_vec());
        tree
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> &[BspNode] {
        &self.nodes
    }

    /// Insert triangles, splitting them down the existing planes. Each
    /// new node takes the plane of the first usable triangle that reaches
    /// it; triangles too thin to define a plane are dropped there.
    pub fn build(&mut self, triangles: Vec<Triangle>) {
        let mut stack = vec![(0usize, triangles)];
        while let Some((idx, tris)) = stack.pop() {
            if tris.is_empty() {
                continue;
            }
            let plane = match self.nodes[idx].plane {
                Some(plane) => plane,
                None => match tris.iter().find_map(Plane::from_triangle) {
                    Some(plane) => {
                        self.nodes[idx].plane = Some(plane);
                        plane
                    }
                    None => continue,
                },
            };

            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            let mut front = Vec::new();
            let mut back = Vec::new();
            for tri in &tris {
                split_triangle(&plane, tri, &mut coplanar_front, &mut coplanar_back, &mut front, &mut back);
            }
            let node = &mut self.nodes[idx];
            node.triangles.extend(coplanar_front);
            node.triangles.extend(coplanar_back);

            if !front.is_empty() {
                stack.push((self.child(idx, true), front));
            }
            if !back.is_empty() {
                stack.push((self.child(idx, false), back));
            }
        }
    }

    fn child(&mut self, idx: usize, front: bool) -> usize {
        let existing = if front { self.nodes[idx].front } else { self.nodes[idx].back };
        if let Some(child) = existing {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(BspNode::default());
        if front {
            self.nodes[idx].front = Some(child);
        } else {
            self.nodes[idx].back = Some(child);
        }
        child
    }

    /// Swap solid and empty space: flip every triangle and plane and
    /// exchange front with back.
    pub fn invert(&mut self) {
        for node in &mut self.nodes {
            for tri in &mut node.triangles {
                *tri = tri.flipped();
            }
            if let Some(plane) = &mut node.plane {
                plane.flip();
            }
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// Remove the parts of `triangles` inside this tree's solid.
    pub fn clip_triangles(&self, triangles: Vec<Triangle>) -> Vec<Triangle> {
        if self.nodes[0].plane.is_none() {
            return triangles;
        }
        let mut kept = Vec::with_capacity(triangles.len());
        let mut stack = vec![(0usize, triangles)];
        while let Some((idx, tris)) = stack.pop() {
            let node = &self.nodes[idx];
            let Some(plane) = node.plane else {
                kept.extend(tris);
                continue;
            };
            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            let mut front = Vec::new();
            let mut back = Vec::new();
            for tri in &tris {
                split_triangle(&plane, tri, &mut coplanar_front, &mut coplanar_back, &mut front, &mut back);
            }
            // Coplanar pieces follow their orientation.
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);
            match node.front {
                Some(child) => stack.push((child, front)),
                None => kept.extend(front),
            }
            if let Some(child) = node.back {
                stack.push((child, back));
            }
        }
        kept
    }

    /// Clip every triangle stored in this tree against `other`.
    pub fn clip_to(&mut self, other: &BspTree) {
        for node in &mut self.nodes {
            let tris = std::mem::take(&mut node.triangles);
            node.triangles = other.clip_triangles(tris);
        }
    }

    /// Every stored triangle, in node order.
    pub fn all_triangles(&self) -> Vec<Triangle> {
        self.nodes.iter().flat_map(|n| n.triangles.iter().copied()).collect()
    }

    /// Number of stored triangles.
    pub fn triangle_count(&self) -> usize {
        self.nodes.iter().map(|n| n.triangles.len()).sum()
    }
}
