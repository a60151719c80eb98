/// A single vertex of the tree: sorted keys and one more child slot than
/// there are keys. Child slots hold arena indices; `None` marks a leaf
/// position. The parent link is a plain arena index (`usize::MAX` for the
/// root) and never owns anything.
pub struct Node<K> {
    pub slot_id: usize,
    pub parent: usize,
    pub keys: Vec<K>,
    pub children: Vec<Option<usize>>,
}

impl<K> Node<K> {
    /// An empty leaf: zero keys, a single absent child. This is also the
    /// representation of an empty tree's root.
    #[must_use]
    pub fn leaf() -> Node<K> {
        Node {
            slot_id: usize::MAX,
            parent: usize::MAX,
            keys: Vec::new(),
            children: vec![None],
        }
    }

    pub fn new(keys: Vec<K>, children: Vec<Option<usize>>, parent: usize) -> Node<K> {
        Node {
            slot_id: usize::MAX,
            parent,
            keys,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

impl<K: Ord> Node<K> {
    /// Locate `key` within this node.
    ///
    /// Returns `(true, i)` if `keys[i]` matches, otherwise `(false, i)` where
    /// `i` is the index of the child subtree that would contain the key
    /// (`0..=keys.len()`). A linear scan is enough: node width is bounded by
    /// the tree's `b` parameter.
    pub fn find_branch(&self, key: &K) -> (bool, usize) {
        let mut i = 0;
        while i < self.keys.len() && self.keys[i] < *key {
            i += 1;
        }
        (i < self.keys.len() && self.keys[i] == *key, i)
    }

    /// Insert `key` before position `i` together with the child that follows
    /// it, keeping the key/child alignment intact.
    pub fn insert_branch(&mut self, i: usize, key: K, child: Option<usize>) {
        self.keys.insert(i, key);
        self.children.insert(i + 1, child);
    }
}
