use crate::{edge, Node, NodeMap, NodeSet, Path, PlannerConfig, RouteError, RouteModel, Weight};

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::{debug, trace};

/// Search bookkeeping for a visited node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    /// Graph-space cost from the start node along the chosen parent chain
    pub g_value: Weight,
    /// Straight-line distance to the end node, fixed at visit time
    pub h_value: Weight,
    pub parent: Option<Node>,
}

impl NodeRecord {
    pub fn f_value(&self) -> Weight {
        self.g_value + self.h_value
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: Weight,
    h: Weight,
    g: Weight,
    seq: u64,
    node: Node,
}

impl PartialEq for OpenEntry {
    fn eq(&self, o: &Self) -> bool {
        self.cmp(o) == Ordering::Equal
    }
}
impl Eq for OpenEntry {}

// Reversed so the max-heap pops the lowest f, then the lowest h, then the
// earliest inserted entry.
impl Ord for OpenEntry {
    fn cmp(&self, o: &Self) -> Ordering {
        o.f.total_cmp(&self.f)
            .then_with(|| o.h.total_cmp(&self.h))
            .then_with(|| o.seq.cmp(&self.seq))
    }
}
impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Transient state of one search, keyed by node index. Cleared at the start of
/// every search.
#[derive(Debug, Default)]
pub struct SearchState {
    visited: NodeSet,
    expanded: NodeSet,
    records: NodeMap<NodeRecord>,
    open_list: BinaryHeap<OpenEntry>,
    seq: u64,
}

impl SearchState {
    fn with_capacity(cap: usize) -> Self {
        Self {
            visited: NodeSet::with_capacity(cap),
            expanded: NodeSet::with_capacity(cap),
            records: NodeMap::with_capacity(cap),
            open_list: BinaryHeap::with_capacity(cap),
            seq: 0,
        }
    }

    fn clear(&mut self) {
        self.visited.clear();
        self.expanded.clear();
        self.records.clear();
        self.open_list.clear();
        self.seq = 0;
    }

    fn push(&mut self, node: Node, record: NodeRecord) {
        self.records.insert(node, record);
        self.seq += 1;
        self.open_list.push(OpenEntry {
            f: record.f_value(),
            h: record.h_value,
            g: record.g_value,
            seq: self.seq,
            node,
        });
    }

    pub fn is_visited(&self, n: Node) -> bool {
        self.visited.has(n)
    }

    pub fn record(&self, n: Node) -> Option<&NodeRecord> {
        self.records.get(n)
    }

    pub fn records(&self) -> impl Iterator<Item = (Node, &NodeRecord)> {
        self.records.iter()
    }

    /// Number of entries still waiting in the frontier
    pub fn open_len(&self) -> usize {
        self.open_list.len()
    }
}

/// A path found by [`RoutePlanner::search`]
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Start to end. Each step holds the graph-space length of the leg leading
    /// to it, 0 for the start node.
    pub path: Path,
    /// Real-world length, graph-space length times the model's metric scale
    pub distance: Weight,
    /// Nodes whose neighbors were expanded
    pub expanded: usize,
}

impl Route {
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.path.iter().map(|e| e.node)
    }

    pub fn start(&self) -> Option<Node> {
        self.path.first().map(|e| e.node)
    }

    pub fn end(&self) -> Option<Node> {
        self.path.last().map(|e| e.node)
    }

    /// Sum of the legs in graph-space units
    pub fn graph_length(&self) -> Weight {
        self.path.iter().map(|e| e.weight).sum()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// A* search between two nodes of a [`RouteModel`], using the straight-line
/// distance to the end node as heuristic.
pub struct RoutePlanner<'a, M: RouteModel + ?Sized> {
    model: &'a M,
    config: PlannerConfig,
    start_node: Node,
    end_node: Node,
    state: SearchState,
    distance: Weight,
}

fn closest_node<M: RouteModel + ?Sized>(
    model: &M,
    x: Weight,
    y: Weight,
) -> Result<Node, RouteError> {
    model
        .closest_node(x, y)
        .ok_or(RouteError::NoClosestNode { x, y })
}

impl<'a, M: RouteModel + ?Sized> RoutePlanner<'a, M> {
    /// Coordinates are scaled by `config.input_scale` (percent by default)
    /// before resolving them to the closest nodes of `model`.
    pub fn new(
        model: &'a M,
        config: PlannerConfig,
        start_x: Weight,
        start_y: Weight,
        end_x: Weight,
        end_y: Weight,
    ) -> Result<Self, RouteError> {
        let scale = config.input_scale;
        let start_node = closest_node(model, start_x * scale, start_y * scale)?;
        let end_node = closest_node(model, end_x * scale, end_y * scale)?;
        debug!(start = %start_node, end = %end_node, "resolved route endpoints");
        Ok(Self::from_nodes(model, config, start_node, end_node))
    }

    pub fn from_nodes(model: &'a M, config: PlannerConfig, start: Node, end: Node) -> Self {
        Self {
            model,
            config,
            start_node: start,
            end_node: end,
            state: SearchState::with_capacity(model.len()),
            distance: 0.0,
        }
    }

    pub fn start_node(&self) -> Node {
        self.start_node
    }

    pub fn end_node(&self) -> Node {
        self.end_node
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Real-world length of the last route found
    pub fn distance(&self) -> Weight {
        self.distance
    }

    pub fn calculate_h_value(&self, node: Node) -> Weight {
        self.model.distance(node, self.end_node)
    }

    fn add_neighbors(&mut self, current: Node) {
        let model = self.model;
        let current_g = self.state.records[current].g_value;
        self.state.expanded.add(current);

        for &neighbor in model.neighbors(current) {
            let g_value = current_g + model.distance(current, neighbor);

            if self.state.visited.add(neighbor) {
                let h_value = self.calculate_h_value(neighbor);
                trace!(node = %neighbor, parent = %current, g_value, h_value, "visit");
                self.state.push(
                    neighbor,
                    NodeRecord {
                        g_value,
                        h_value,
                        parent: Some(current),
                    },
                );
            } else if self.config.relax_visited && !self.state.expanded.has(neighbor) {
                let record = self.state.records[neighbor];
                if g_value < record.g_value {
                    trace!(node = %neighbor, parent = %current, g_value, "relax");
                    self.state.push(
                        neighbor,
                        NodeRecord {
                            g_value,
                            parent: Some(current),
                            ..record
                        },
                    );
                }
            }
        }
    }

    fn next_node(&mut self) -> Option<Node> {
        while let Some(entry) = self.state.open_list.pop() {
            // Superseded by a cheaper entry for the same node
            if self.state.expanded.has(entry.node)
                || entry.g > self.state.records[entry.node].g_value
            {
                continue;
            }
            return Some(entry.node);
        }
        None
    }

    /// Run the search from the start node until the end node is reached or the
    /// frontier runs out.
    pub fn search(&mut self) -> Result<Route, RouteError> {
        self.state.clear();
        self.distance = 0.0;

        let start = self.start_node;
        let end = self.end_node;
        let h_value = self.calculate_h_value(start);
        self.state.visited.add(start);
        self.state.records.insert(
            start,
            NodeRecord {
                g_value: 0.0,
                h_value,
                parent: None,
            },
        );

        let mut current = start;
        let mut expanded = 0;
        while current != end {
            self.add_neighbors(current);
            expanded += 1;

            current = match self.next_node() {
                Some(n) => n,
                None => {
                    debug!(%start, %end, expanded, "frontier exhausted");
                    return Err(RouteError::Unreachable { start, end });
                }
            };
        }

        let route = self.construct_final_path(end, expanded);
        debug!(
            %start,
            %end,
            expanded,
            nodes = route.len(),
            distance = route.distance,
            "route found"
        );
        Ok(route)
    }

    fn construct_final_path(&mut self, end: Node, expanded: usize) -> Route {
        let mut distance = 0.0;
        let mut path = Path::new();
        let mut current = end;

        while let Some(parent) = self.state.records[current].parent {
            let leg = self.model.distance(current, parent);
            path.push(edge(current, leg));
            distance += leg;
            current = parent;
        }
        path.push(edge(current, 0.0));
        path.reverse();

        self.distance = distance * self.model.metric_scale();
        Route {
            path,
            distance: self.distance,
            expanded,
        }
    }
}

/// Plan a route between two coordinates and store it in the model's path slot
pub fn plan_route<M: RouteModel + ?Sized>(
    model: &mut M,
    config: PlannerConfig,
    start_x: Weight,
    start_y: Weight,
    end_x: Weight,
    end_y: Weight,
) -> Result<Route, RouteError> {
    let route = RoutePlanner::new(&*model, config, start_x, start_y, end_x, end_y)?.search()?;
    model.store_path(route.path.clone());
    Ok(route)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::RouteGraph;

    fn approx_eq(a: Weight, b: Weight) -> bool {
        (a - b).abs() < 1e-4
    }

    /// A B
    /// D C
    fn example_square() -> (RouteGraph, [Node; 4]) {
        let mut g = RouteGraph::new();
        let a = g.add_node((0.0, 0.0));
        let b = g.add_node((1.0, 0.0));
        let c = g.add_node((1.0, 1.0));
        let d = g.add_node((0.0, 1.0));
        g.add_edge(a, b);
        g.add_edge(b, c);
        g.add_edge(c, d);
        g.add_edge(d, a);
        (g, [a, b, c, d])
    }

    /// X is first reached through P1, but the way through P2 is shorter.
    fn example_detour() -> (RouteGraph, [Node; 5]) {
        let mut g = RouteGraph::new();
        let s = g.add_node((0.0, 0.0));
        let p1 = g.add_node((2.0, 1.0));
        let p2 = g.add_node((1.0, -1.0));
        let x = g.add_node((2.5, -0.5));
        let e = g.add_node((4.0, 0.0));
        g.add_edge(s, p1);
        g.add_edge(s, p2);
        g.add_edge(p1, x);
        g.add_edge(p2, x);
        g.add_edge(x, e);
        (g, [s, p1, p2, x, e])
    }

    fn example_grid(w: usize, h: usize) -> RouteGraph {
        let mut g = RouteGraph::new().with_metric_scale(3.0);
        let ns: Vec<Node> = (0..w * h)
            .map(|i| g.add_node(((i % w) as f32, (i / w) as f32)))
            .collect();
        for y in 0..h {
            for x in 0..w {
                let n = ns[x + y * w];
                if x + 1 < w {
                    g.add_edge(n, ns[x + 1 + y * w]);
                }
                if y + 1 < h {
                    g.add_edge(n, ns[x + (y + 1) * w]);
                }
                if x + 1 < w && y + 1 < h {
                    g.add_edge(n, ns[x + 1 + (y + 1) * w]);
                }
            }
        }
        g
    }

    fn check_route(g: &RouteGraph, route: &Route, start: Node, end: Node) {
        assert_eq!(route.start(), Some(start));
        assert_eq!(route.end(), Some(end));
        let nodes: Vec<Node> = route.nodes().collect();
        for w in nodes.windows(2) {
            assert!(g.has_edge(w[0], w[1]), "{} -> {} is not an edge", w[0], w[1]);
        }
        let legs: Weight = nodes
            .windows(2)
            .map(|w| RouteModel::distance(g, w[0], w[1]))
            .sum();
        assert!(approx_eq(route.graph_length(), legs));
        assert!(approx_eq(route.distance, legs * g.metric_scale()));
    }

    #[test]
    fn square_opposite_corners() {
        let (g, [a, b, c, _]) = example_square();
        let mut planner =
            RoutePlanner::new(&g, PlannerConfig::default(), 0.0, 0.0, 100.0, 100.0).unwrap();
        assert_eq!(planner.start_node(), a);
        assert_eq!(planner.end_node(), c);

        let route = planner.search().unwrap();
        assert_eq!(route.len(), 3);
        assert!(approx_eq(route.distance, 2.0));
        assert!(approx_eq(planner.distance(), 2.0));
        check_route(&g, &route, a, c);
        // Equal f and h at B and D, B was queued first
        assert_eq!(route.path[1].node, b);
    }

    #[test]
    fn equal_f_prefers_lower_h() {
        let mut g = RouteGraph::new();
        let s = g.add_node((0.0, 0.0));
        let e = g.add_node((8.0, 0.0));
        let a = g.add_node((4.0, 3.0));
        let d = g.add_node((9.0, 0.0));
        g.add_edge(s, a);
        g.add_edge(s, d);
        g.add_edge(a, e);
        g.add_edge(d, e);

        // A: g 5 + h 5, D: g 9 + h 1. A was queued first.
        let mut planner = RoutePlanner::from_nodes(&g, PlannerConfig::default(), s, e);
        let route = planner.search().unwrap();
        assert_eq!(route.nodes().collect::<Vec<_>>(), vec![s, d, e]);
        assert_eq!(route.expanded, 2);
        assert!(planner.state().is_visited(a));
        assert!(approx_eq(route.distance, 10.0));
    }

    #[test]
    fn start_is_end() {
        let (g, [_, b, _, _]) = example_square();
        let mut planner =
            RoutePlanner::new(&g, PlannerConfig::default(), 100.0, 0.0, 90.0, 10.0).unwrap();
        let route = planner.search().unwrap();
        assert_eq!(route.path, vec![edge(b, 0.0)]);
        assert_eq!(route.distance, 0.0);
        assert_eq!(route.expanded, 0);
    }

    #[test]
    fn unreachable_end() {
        let (mut g, [a, ..]) = example_square();
        let e = g.add_node((5.0, 5.0));
        let f = g.add_node((6.0, 5.0));
        g.add_edge(e, f);

        let mut planner = RoutePlanner::from_nodes(&g, PlannerConfig::default(), a, f);
        assert_eq!(
            planner.search(),
            Err(RouteError::Unreachable { start: a, end: f })
        );
        assert_eq!(planner.state().open_len(), 0);
        for n in [e, f] {
            assert!(!planner.state().is_visited(n));
        }
    }

    #[test]
    fn empty_model() {
        let g = RouteGraph::new();
        let config = PlannerConfig::default().with_input_scale(1.0);
        let res = RoutePlanner::new(&g, config, 0.25, 0.5, 0.75, 1.0);
        assert_eq!(
            res.err(),
            Some(RouteError::NoClosestNode { x: 0.25, y: 0.5 })
        );
    }

    #[test]
    fn non_finite_coordinates() {
        let (g, _) = example_square();
        let res = RoutePlanner::new(&g, PlannerConfig::default(), Weight::NAN, 0.0, 100.0, 0.0);
        assert!(matches!(res.err(), Some(RouteError::NoClosestNode { x, .. }) if x.is_nan()));

        let res = RoutePlanner::new(&g, PlannerConfig::default(), 0.0, 0.0, 100.0, Weight::NAN);
        assert!(matches!(res.err(), Some(RouteError::NoClosestNode { y, .. }) if y.is_nan()));
    }

    #[test]
    fn input_scale() {
        let (g, [a, _, c, _]) = example_square();
        let config = PlannerConfig::default().with_input_scale(1.0);
        let planner = RoutePlanner::new(&g, config, 0.0, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(planner.start_node(), a);
        assert_eq!(planner.end_node(), c);
    }

    #[test]
    fn h_value_is_distance_to_end() {
        let g = example_grid(6, 5);
        let mut planner =
            RoutePlanner::new(&g, PlannerConfig::default(), 0.0, 100.0, 100.0, 0.0).unwrap();
        planner.search().unwrap();
        let end = planner.end_node();
        let mut count = 0;
        for (n, record) in planner.state().records() {
            assert!(planner.state().is_visited(n));
            assert_eq!(record.h_value, RouteModel::distance(&g, n, end));
            assert_eq!(record.h_value, planner.calculate_h_value(n));
            count += 1;
        }
        assert!(count > 1);
    }

    #[test]
    fn g_value_grows_along_parents() {
        for relax in [false, true] {
            let g = example_grid(7, 4);
            let config = PlannerConfig::default().with_relaxation(relax);
            let mut planner = RoutePlanner::new(&g, config, 0.0, 0.0, 100.0, 100.0).unwrap();
            planner.search().unwrap();
            let state = planner.state();
            for (n, record) in state.records() {
                match record.parent {
                    Some(p) => assert!(record.g_value > state.record(p).unwrap().g_value),
                    None => {
                        assert_eq!(n, planner.start_node());
                        assert_eq!(record.g_value, 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn grid_route_is_connected_and_scaled() {
        let g = example_grid(8, 6);
        let mut planner =
            RoutePlanner::new(&g, PlannerConfig::default(), 0.0, 0.0, 100.0, 60.0).unwrap();
        let route = planner.search().unwrap();
        check_route(&g, &route, planner.start_node(), planner.end_node());
        assert!(route.expanded >= route.len() - 1);
    }

    #[test]
    fn repeated_search_is_identical() {
        let g = example_grid(9, 9);
        let mut planner =
            RoutePlanner::new(&g, PlannerConfig::default(), 10.0, 90.0, 80.0, 20.0).unwrap();
        let first = planner.search().unwrap();
        let second = planner.search().unwrap();
        assert_eq!(first, second);

        let mut other =
            RoutePlanner::new(&g, PlannerConfig::default(), 10.0, 90.0, 80.0, 20.0).unwrap();
        assert_eq!(other.search().unwrap(), first);
    }

    #[test]
    fn visited_nodes_keep_first_parent() {
        let (g, [s, p1, _, x, e]) = example_detour();
        let mut planner = RoutePlanner::from_nodes(&g, PlannerConfig::default(), s, e);
        let route = planner.search().unwrap();
        assert_eq!(route.nodes().collect::<Vec<_>>(), vec![s, p1, x, e]);
        check_route(&g, &route, s, e);
    }

    #[test]
    fn relaxation_finds_shorter_detour() {
        let (g, [s, p1, p2, x, e]) = example_detour();
        let config = PlannerConfig::default().with_relaxation(true);
        let mut planner = RoutePlanner::from_nodes(&g, config, s, e);
        let route = planner.search().unwrap();
        assert_eq!(route.nodes().collect::<Vec<_>>(), vec![s, p2, x, e]);
        check_route(&g, &route, s, e);

        let mut plain = RoutePlanner::from_nodes(&g, PlannerConfig::default(), s, e);
        assert!(route.distance < plain.search().unwrap().distance);
        assert_eq!(planner.state().record(x).unwrap().parent, Some(p2));
        assert_ne!(planner.state().record(x).unwrap().parent, Some(p1));
    }

    #[test]
    fn plan_route_stores_path() {
        let (mut g, [a, _, c, _]) = example_square();
        let route = plan_route(&mut g, PlannerConfig::default(), 0.0, 0.0, 100.0, 100.0).unwrap();
        assert_eq!(g.path(), &route.path);
        assert_eq!(g.path().first().map(|e| e.node), Some(a));
        assert_eq!(g.path().last().map(|e| e.node), Some(c));
    }

    #[test]
    fn plan_route_failure_leaves_path() {
        let (mut g, [a, b, ..]) = example_square();
        g.store_path(vec![edge(a, 0.0), edge(b, 1.0)]);
        let lonely = g.add_node((9.0, 9.0));
        let other = g.add_node((9.0, 8.0));
        g.add_edge(lonely, other);
        let res = plan_route(&mut g, PlannerConfig::default(), 0.0, 0.0, 100.0, 100.0);
        assert_eq!(res, Err(RouteError::Unreachable { start: a, end: lonely }));
        assert_eq!(g.path().len(), 2);
    }
}
