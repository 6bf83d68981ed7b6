use route_planner::{Bounds, Node, NodeMap, Position, RouteGraph, Weight};

use movingai::{Coords2D, Map2D as _, MovingAiMap};

use std::collections::HashMap;

/// A MovingAI map as an 8-connected graph, one node per cell at its grid
/// coordinates.
pub struct GridGraph {
    pub graph: RouteGraph,
    pub coord2node: HashMap<Coords2D, Node>,
    pub node2coord: NodeMap<Coords2D>,
    width: usize,
    height: usize,
}

fn neighbors(map: &MovingAiMap, tile: Coords2D) -> Vec<Coords2D> {
    let (x, y) = (tile.0 as isize, tile.1 as isize);
    let all: [(isize, isize); 8] = [
        (x + 1, y),
        (x + 1, y + 1),
        (x + 1, y - 1),
        (x, y + 1),
        (x, y - 1),
        (x - 1, y),
        (x - 1, y - 1),
        (x - 1, y + 1),
    ];
    all.into_iter()
        .filter(|&(x, y)| {
            x >= 0 && x < map.width() as isize && y >= 0 && y < map.height() as isize
        })
        .map(|(x, y)| (x as usize, y as usize))
        .filter(|n| map.is_traversable_from(tile, *n))
        .collect()
}

impl GridGraph {
    pub fn from_map(map: &MovingAiMap, metric_scale: Weight) -> Self {
        let (width, height) = (map.width(), map.height());
        let size = width * height;
        let mut graph = RouteGraph::with_capacity(size).with_metric_scale(metric_scale);
        let mut coord2node = HashMap::<Coords2D, Node>::with_capacity(size);
        let mut node2coord = NodeMap::<Coords2D>::with_capacity(size);

        for y in 0..height {
            for x in 0..width {
                let n = graph.add_node((x as Weight, y as Weight));
                coord2node.insert((x, y), n);
                node2coord.insert(n, (x, y));
            }
        }

        for coord in map.coords() {
            let n = coord2node[&coord];
            for neighbour in neighbors(map, coord) {
                graph.add_edge(n, coord2node[&neighbour]);
            }
        }

        graph.set_bounds(Bounds::new(
            Position::new(0.0, 0.0),
            Position::new(
                width.saturating_sub(1) as Weight,
                height.saturating_sub(1) as Weight,
            ),
        ));

        Self {
            graph,
            coord2node,
            node2coord,
            width,
            height,
        }
    }

    /// Cell coordinates as percentages of the grid extent
    pub fn to_percent(&self, (x, y): Coords2D) -> (Weight, Weight) {
        fn pct(v: usize, extent: usize) -> Weight {
            if extent <= 1 {
                0.0
            } else {
                v as Weight / (extent - 1) as Weight * 100.0
            }
        }
        (pct(x, self.width), pct(y, self.height))
    }
}
