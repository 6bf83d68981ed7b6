use crate::RouteGraph as Graph;

mod dot {
    use crate::{Node, NodeSet, RouteGraph as Graph};

    const PATH_COLOR: &str = "red";

    fn write_header(name: &str, out: &mut String) {
        out.push_str("graph ");
        out.push_str(name);
        out.push_str(" {\n");
    }

    fn write_footer(out: &mut String) {
        out.push_str("}\n");
    }

    fn on_path(g: &Graph) -> (NodeSet, Vec<(Node, Node)>) {
        let mut nodes = NodeSet::with_capacity(g.len());
        let mut legs = Vec::new();
        let path = g.path();
        for e in path {
            nodes.add(e.node);
        }
        for w in path.windows(2) {
            let (a, b) = (w[0].node, w[1].node);
            legs.push((a.min(b), a.max(b)));
        }
        (nodes, legs)
    }

    pub fn write(g: &Graph, out: &mut String) {
        write_header("G", out);

        let (path_nodes, path_legs) = on_path(g);

        for n in g.nodes() {
            let p = g.position(n);
            out.push_str(&format!("{} [pos = \"{},{}!\"", n, p.x, p.y));
            if path_nodes.has(n) {
                out.push_str(&format!(", color = {PATH_COLOR}"));
            }
            out.push_str("];\n");
        }

        for n in g.nodes() {
            // Undirected, every edge is stored on both ends
            for &m in g.neighbors(n).iter().filter(|&&m| n < m) {
                out.push_str(&format!("{} -- {}", n, m));
                if path_legs.contains(&(n, m)) {
                    out.push_str(&format!(" [color = {PATH_COLOR}]"));
                }
                out.push_str(";\n");
            }
        }

        write_footer(out);
    }
}

/// Graphviz rendering of `g`, with the stored path highlighted
pub fn to_dot(g: &Graph) -> String {
    let mut out = String::new();
    dot::write(g, &mut out);
    out
}
