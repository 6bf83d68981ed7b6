mod astar;
mod config;
mod error;
mod fmt;
mod map;
mod model;
mod set;

pub use astar::{plan_route, NodeRecord, Route, RoutePlanner, SearchState};
pub use config::PlannerConfig;
pub use error::RouteError;
pub use map::NodeMap;
pub use model::RouteModel;
pub use set::NodeSet;

pub use fmt::to_dot;

pub type Path = Vec<Edge>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node(usize);

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("N{}", self.0))
    }
}

pub type Weight = f32;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: Weight,
    pub y: Weight,
}

impl Position {
    pub fn new(x: Weight, y: Weight) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, o: &Position) -> Weight {
        let x = o.x - self.x;
        let y = o.y - self.y;
        (x.powi(2) + y.powi(2)).sqrt()
    }
}

impl From<(Weight, Weight)> for Position {
    fn from((x, y): (Weight, Weight)) -> Self {
        Position { x, y }
    }
}

/// Axis aligned region that normalized coordinates are mapped onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    pub fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    fn around(p: Position) -> Self {
        Self { min: p, max: p }
    }

    fn extend(&mut self, p: Position) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Map a 0-1 fraction of the span onto a graph-space position
    pub fn lerp(&self, fx: Weight, fy: Weight) -> Position {
        Position {
            x: self.min.x + fx * (self.max.x - self.min.x),
            y: self.min.y + fy * (self.max.y - self.min.y),
        }
    }
}

/// One step of a path: the node reached and the length of the leg leading to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub node: Node,
    pub weight: Weight,
}

fn edge(n: Node, weight: Weight) -> Edge {
    Edge { node: n, weight }
}

/// Undirected graph embedded in 2-D space
#[derive(Clone)]
pub struct RouteGraph {
    nodes: Vec<Vec<Node>>,
    positions: Vec<Position>,
    bounds: Option<Bounds>,
    metric_scale: Weight,
    path: Path,
}

impl Default for RouteGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGraph {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(cap),
            positions: Vec::with_capacity(cap),
            bounds: None,
            metric_scale: 1.0,
            path: Path::new(),
        }
    }

    pub fn with_metric_scale(mut self, scale: Weight) -> Self {
        self.metric_scale = scale;
        self
    }

    pub fn add_node(&mut self, pos: impl Into<Position>) -> Node {
        let pos = pos.into();
        let n = Node(self.nodes.len());
        self.nodes.push(Vec::new());
        self.positions.push(pos);
        match &mut self.bounds {
            Some(b) => b.extend(pos),
            None => self.bounds = Some(Bounds::around(pos)),
        }
        n
    }

    fn is_valid(&self, n: Node) -> bool {
        n.0 < self.nodes.len()
    }

    pub fn add_edge(&mut self, a: Node, b: Node) {
        assert!(self.is_valid(a) && self.is_valid(b));
        if a == b || self.has_edge_unchecked(a, b) {
            return;
        }
        self.nodes[a.0].push(b);
        self.nodes[b.0].push(a);
    }

    fn has_edge_unchecked(&self, a: Node, b: Node) -> bool {
        self.nodes[a.0].contains(&b)
    }

    pub fn has_edge(&self, a: Node, b: Node) -> bool {
        if !self.is_valid(a) || !self.is_valid(b) {
            return false;
        }

        self.has_edge_unchecked(a, b)
    }

    pub fn neighbors(&self, n: Node) -> &[Node] {
        assert!(self.is_valid(n));
        &self.nodes[n.0]
    }

    pub fn position(&self, n: Node) -> Position {
        assert!(self.is_valid(n));
        self.positions[n.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = Node> {
        (0..self.nodes.len()).map(Node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Override the region spanned by normalized coordinates. By default this
    /// is the bounding box of all node positions.
    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RouteModel for RouteGraph {
    /// Only nodes with at least one neighbor are candidates, a node that lies
    /// on no way cannot be routed from or to.
    fn closest_node(&self, fx: Weight, fy: Weight) -> Option<Node> {
        if !fx.is_finite() || !fy.is_finite() {
            return None;
        }
        let target = self.bounds?.lerp(fx, fy);
        let mut best: Option<(Node, Weight)> = None;
        for n in self.nodes() {
            if self.nodes[n.0].is_empty() {
                continue;
            }
            let d = self.positions[n.0].distance(&target);
            match best {
                Some((_, best_d)) if best_d <= d => (),
                _ => best = Some((n, d)),
            }
        }
        best.map(|(n, _)| n)
    }

    fn neighbors(&self, node: Node) -> &[Node] {
        RouteGraph::neighbors(self, node)
    }

    fn distance(&self, a: Node, b: Node) -> Weight {
        self.position(a).distance(&self.position(b))
    }

    fn metric_scale(&self) -> Weight {
        self.metric_scale
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn store_path(&mut self, path: Path) {
        self.path = path;
    }
}
