use crate::{Node, Path, Weight};

/// The graph a [`RoutePlanner`](crate::RoutePlanner) searches over.
pub trait RouteModel {
    /// Nearest routable node to a point given as a 0-1 fraction of the
    /// model's coordinate span.
    fn closest_node(&self, fx: Weight, fy: Weight) -> Option<Node>;

    fn neighbors(&self, node: Node) -> &[Node];

    /// Straight-line distance in graph-space units
    fn distance(&self, a: Node, b: Node) -> Weight;

    /// Multiplier from graph-space distance to real-world distance, e.g. meters
    fn metric_scale(&self) -> Weight;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Output slot for the most recently planned path
    fn store_path(&mut self, path: Path);
}
