use thiserror::Error;

use crate::{Node, Weight};

#[derive(Debug, Error, PartialEq)]
pub enum RouteError {
    /// The model had no routable node to offer for a coordinate.
    #[error("no node close to ({x}, {y})")]
    NoClosestNode { x: Weight, y: Weight },

    /// The frontier ran dry before the end node was reached.
    #[error("no path from {start} to {end}")]
    Unreachable { start: Node, end: Node },
}
