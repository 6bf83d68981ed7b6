use crate::Node;

// TODO: Bitset
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    v: Vec<bool>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self { v: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            v: Vec::with_capacity(capacity),
        }
    }

    /// Returns true if `n` was not already in the set
    pub fn add(&mut self, n: Node) -> bool {
        let i = n.0;
        if i >= self.v.len() {
            self.v.resize(i + 1, false);
        }
        !std::mem::replace(&mut self.v[i], true)
    }

    pub fn has(&self, n: Node) -> bool {
        self.v.get(n.0).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.v.clear();
    }

    pub fn len(&self) -> usize {
        self.v.iter().filter(|&&b| b).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
