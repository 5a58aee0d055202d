/// A single record in the skip list.
///
/// The key is immutable after creation; the value is mutable through
/// [`Node::value_mut`]. `forward` holds one successor per level the node
/// participates in (`level + 1` entries), as indices into the list's
/// arena — `None` means the node is last at that level.
pub(crate) struct Node<K, V> {
    key: K,
    value: V,
    pub(crate) forward: Vec<Option<usize>>,
}

impl<K, V> Node<K, V> {
    /// Create a node participating in levels `0..=level`, with all
    /// successors unset.
    pub(crate) fn new(key: K, value: V, level: usize) -> Self {
        Node {
            key,
            value,
            forward: vec![None; level + 1],
        }
    }

    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    pub(crate) fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Highest level this node participates in.
    pub(crate) fn level(&self) -> usize {
        self.forward.len() - 1
    }
}
