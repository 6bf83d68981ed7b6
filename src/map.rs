use crate::Node;

/// Dense per-node storage, indexed by the node handle
#[derive(Debug, Clone)]
pub struct NodeMap<T> {
    v: Vec<Option<T>>,
}

impl<T> Default for NodeMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::ops::Index<Node> for NodeMap<T> {
    type Output = T;
    fn index(&self, n: Node) -> &T {
        match self.get(n) {
            Some(t) => t,
            None => panic!("Node not in map: {:?}", n),
        }
    }
}

impl<T> NodeMap<T> {
    pub fn new() -> Self {
        Self { v: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            v: Vec::with_capacity(cap),
        }
    }

    /// Returns the previous value, if any
    pub fn insert(&mut self, n: Node, t: T) -> Option<T> {
        let i = n.0;
        if i >= self.v.len() {
            self.v.resize_with(i + 1, || None);
        }
        self.v[i].replace(t)
    }

    pub fn has(&self, n: Node) -> bool {
        self.get(n).is_some()
    }

    pub fn get(&self, n: Node) -> Option<&T> {
        self.v.get(n.0).and_then(Option::as_ref)
    }

    /// Drop all entries, keeping the allocation
    pub fn clear(&mut self) {
        self.v.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Node, &T)> {
        self.v
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.as_ref().map(|t| (Node(i), t)))
    }

    pub fn len(&self) -> usize {
        self.v.iter().filter(|t| t.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
