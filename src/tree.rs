use crate::{arena::Arena, error::TreeError, node::Node};

/// An (a,b)-tree: a balanced search tree whose nodes carry between `a` and
/// `b` children (the root excepted), generalizing the B-tree. Keys are kept
/// in sorted order across the whole tree; lookups, insertions and
/// minimum-deletions all run in `O(log n)`.
pub struct ABTree<K> {
    min_fanout: usize,
    max_fanout: usize,
    root: usize,
    len: usize,
    arena: Arena<K>,
}

impl<K: Ord> ABTree<K> {
    /// Create an empty tree with minimum fanout `a` and maximum fanout `b`.
    ///
    /// # Errors
    /// Returns [`TreeError::Configuration`] unless `a >= 2` and
    /// `b >= 2 * a - 1`; looser parameters cannot keep both halves of a
    /// split within bounds.
    pub fn new(a: usize, b: usize) -> Result<Self, TreeError> {
        if a < 2 || b < 2 * a - 1 {
            return Err(TreeError::Configuration { a, b });
        }
        let mut arena = Arena::new();
        let root = arena.insert(Node::leaf());
        Ok(ABTree {
            min_fanout: a,
            max_fanout: b,
            root,
            len: 0,
            arena,
        })
    }

    /// Check whether `key` is present in the tree.
    #[must_use]
    pub fn find(&self, key: &K) -> bool {
        let mut node = self.root;
        loop {
            let (found, i) = self.arena.nodes[node].find_branch(key);
            if found {
                return true;
            }
            match self.arena.nodes[node].children[i] {
                Some(child) => node = child,
                None => return false,
            }
        }
    }

    /// Add `key` to the tree; a no-op if it is already present.
    pub fn insert(&mut self, key: K) {
        // Descend to the leaf, recording (node, position) for every node
        // walked through so promoted keys know where to land.
        let mut node = self.root;
        let mut ancestors = Vec::new();
        let mut i;
        loop {
            let (found, position) = self.arena.nodes[node].find_branch(&key);
            if found {
                return;
            }
            i = position;
            match self.arena.nodes[node].children[i] {
                Some(child) => {
                    ancestors.push((node, i));
                    node = child;
                }
                None => break,
            }
        }

        self.arena.nodes[node].insert_branch(i, key, None);
        self.len += 1;

        // Split overflowing nodes upward; each split drops the node back
        // below the bound, so the walk ends at the latest above the root.
        while self.arena.nodes[node].keys.len() >= self.max_fanout {
            let (sibling, mid_key) = self.split_node(node, self.max_fanout / 2 + 1);
            if let Some((parent, position)) = ancestors.pop() {
                self.arena.nodes[parent].insert_branch(position, mid_key, Some(sibling));
                node = parent;
            } else {
                // The root itself split: grow the tree by one level.
                let new_root = self.arena.insert(Node::new(
                    vec![mid_key],
                    vec![Some(node), Some(sibling)],
                    usize::MAX,
                ));
                self.arena.nodes[node].parent = new_root;
                self.arena.nodes[sibling].parent = new_root;
                self.root = new_root;
                break;
            }
        }
    }

    /// Remove and return the smallest key in the tree.
    ///
    /// # Errors
    /// Returns [`TreeError::EmptyTree`] if the tree holds no keys.
    pub fn delete_min(&mut self) -> Result<K, TreeError> {
        if self.len == 0 {
            return Err(TreeError::EmptyTree);
        }

        // The minimum lives in the leftmost leaf.
        let mut node = self.root;
        while let Some(child) = self.arena.nodes[node].children[0] {
            node = child;
        }
        let min_key = self.arena.nodes[node].keys.remove(0);
        self.arena.nodes[node].children.remove(0);
        self.len -= 1;

        // Repair underflow upward. Deletion only ever touches the leftmost
        // branch, so the node that underflows at each level is always its
        // parent's first child; the second child is the repair partner.
        while self.arena.nodes[node].children.len() < self.min_fanout
            && self.arena.nodes[node].parent != usize::MAX
        {
            node = self.arena.nodes[node].parent;
            let first = self.arena.nodes[node].children[0].unwrap();
            let second = self.arena.nodes[node].children[1].unwrap();

            if self.arena.nodes[second].children.len() == self.min_fanout {
                // The second child cannot lend without underflowing itself:
                // merge it into the first, pulling the separator key down.
                let separator = self.arena.nodes[node].keys.remove(0);
                self.arena.nodes[node].children.remove(1);

                let moved_keys = std::mem::take(&mut self.arena.nodes[second].keys);
                let moved_children = std::mem::take(&mut self.arena.nodes[second].children);
                for child in moved_children.iter().copied().flatten() {
                    self.arena.nodes[child].parent = first;
                }
                let target = &mut self.arena.nodes[first];
                target.children.extend(moved_children);
                target.keys.push(separator);
                target.keys.extend(moved_keys);
                self.arena.remove(second);
            } else {
                // Borrow the second child's leftmost child, rotating the
                // separator key down and its successor up.
                let moved_child = self.arena.nodes[second].children.remove(0);
                let replacement = self.arena.nodes[second].keys.remove(0);
                let separator = std::mem::replace(&mut self.arena.nodes[node].keys[0], replacement);
                if let Some(child) = moved_child {
                    self.arena.nodes[child].parent = first;
                }
                let target = &mut self.arena.nodes[first];
                target.keys.push(separator);
                target.children.push(moved_child);
            }
        }

        // Only the root can end the climb with a single child; collapse it
        // unless that child is the absence marker of a now-empty tree.
        if self.arena.nodes[node].children.len() == 1 {
            if let Some(child) = self.arena.nodes[node].children[0] {
                self.arena.remove(node);
                self.arena.nodes[child].parent = usize::MAX;
                self.root = child;
            }
        }

        Ok(min_key)
    }

    /// The smallest key currently in the tree, if any.
    #[must_use]
    pub fn peek_min(&self) -> Option<&K> {
        let mut node = self.root;
        while let Some(child) = self.arena.nodes[node].children[0] {
            node = child;
        }
        self.arena.nodes[node].keys.first()
    }

    /// Number of keys stored in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels below the root; 0 when the root is a leaf. Every
    /// leaf sits at the same depth, so the leftmost path measures it.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut node = self.root;
        while let Some(child) = self.arena.nodes[node].children[0] {
            node = child;
            height += 1;
        }
        height
    }

    // Split the node so that it keeps its first `size` children; a new
    // sibling takes everything after them. The key between the two halves is
    // promoted out of both and returned along with the sibling's slot.
    fn split_node(&mut self, node: usize, size: usize) -> (usize, K) {
        let parent = self.arena.nodes[node].parent;
        let moved_keys = self.arena.nodes[node].keys.split_off(size);
        let moved_children = self.arena.nodes[node].children.split_off(size);
        let mid_key = self.arena.nodes[node].keys.pop().unwrap();

        let sibling = self
            .arena
            .insert(Node::new(moved_keys, moved_children, parent));
        for child in self.arena.nodes[sibling].children.clone() {
            if let Some(child) = child {
                self.arena.nodes[child].parent = sibling;
            }
        }
        (sibling, mid_key)
    }
}

impl<K: Ord> Default for ABTree<K> {
    fn default() -> Self {
        ABTree::new(2, 3).expect("Invalid branching factors")
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::ABTree;

    impl<K: Ord> ABTree<K> {
        // Walk the whole tree and assert every structural invariant.
        fn check_invariants(&self) {
            assert_eq!(self.arena.nodes[self.root].parent, usize::MAX);
            let mut leaf_depths = Vec::new();
            self.check_node(self.root, None, None, 0, &mut leaf_depths);
            assert!(
                leaf_depths.windows(2).all(|w| w[0] == w[1]),
                "leaves at unequal depths"
            );
        }

        fn check_node(
            &self,
            node_id: usize,
            lower: Option<&K>,
            upper: Option<&K>,
            depth: usize,
            leaf_depths: &mut Vec<usize>,
        ) {
            let node = &self.arena.nodes[node_id];
            assert_eq!(node.slot_id, node_id);
            assert_eq!(node.children.len(), node.keys.len() + 1);
            if node_id != self.root {
                assert!(node.children.len() >= self.min_fanout);
                assert!(node.children.len() <= self.max_fanout);
            }

            for window in node.keys.windows(2) {
                assert!(window[0] < window[1], "keys not strictly increasing");
            }
            for key in &node.keys {
                if let Some(lower) = lower {
                    assert!(lower < key, "key at or below its subtree bound");
                }
                if let Some(upper) = upper {
                    assert!(key < upper, "key at or above its subtree bound");
                }
            }

            if node.is_leaf() {
                leaf_depths.push(depth);
                return;
            }
            for (i, child) in node.children.iter().enumerate() {
                let child = child.expect("internal node with absent child");
                assert_eq!(self.arena.nodes[child].parent, node_id);
                let lower = if i == 0 { lower } else { Some(&node.keys[i - 1]) };
                let upper = node.keys.get(i).or(upper);
                self.check_node(child, lower, upper, depth + 1, leaf_depths);
            }
        }
    }

    #[test]
    fn split_node() {
        let mut tree = ABTree::new(2, 5).unwrap();
        for key in 1..=4 {
            tree.insert(key);
        }

        // The root leaf holds keys 1..=4; keep the first 3 children.
        let (sibling, mid_key) = tree.split_node(tree.root, 3);
        assert_eq!(mid_key, 3);
        assert_eq!(tree.arena.nodes[tree.root].keys, vec![1, 2]);
        assert_eq!(tree.arena.nodes[tree.root].children.len(), 3);
        assert_eq!(tree.arena.nodes[sibling].keys, vec![4]);
        assert_eq!(tree.arena.nodes[sibling].children.len(), 2);
    }

    #[test]
    fn split_node_reparents_children() {
        let mut tree = ABTree::new(2, 3).unwrap();
        for key in 1..=8 {
            tree.insert(key);
        }
        assert!(tree.height() >= 2);

        // Splitting an internal node must update the parent link of every
        // child handed to the sibling; the invariant walk verifies that.
        tree.check_invariants();
    }

    #[test]
    fn root_split_grows_height() {
        let mut tree = ABTree::new(2, 3).unwrap();
        tree.insert(1);
        tree.insert(2);
        assert_eq!(tree.height(), 0);

        // The third key overflows the root leaf and grows a new root.
        tree.insert(3);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.arena.nodes[tree.root].keys, vec![2]);
        tree.check_invariants();
        for key in 1..=3 {
            assert!(tree.find(&key));
        }
    }

    #[test]
    fn root_collapse_shrinks_height() {
        let mut tree = ABTree::new(2, 3).unwrap();
        for key in 1..=4 {
            tree.insert(key);
        }
        assert_eq!(tree.height(), 1);

        // Draining the tree merges the root's children back together.
        while !tree.is_empty() {
            tree.delete_min().unwrap();
            tree.check_invariants();
        }
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn emptied_tree_stays_usable() {
        let mut tree = ABTree::default();
        tree.insert(7);
        assert_eq!(tree.delete_min(), Ok(7));

        // The empty state must be the leaf root again, not a dangling slot.
        assert!(tree.is_empty());
        assert!(!tree.find(&7));
        tree.insert(9);
        assert!(tree.find(&9));
        tree.check_invariants();
    }

    #[test]
    fn verify_fanout_params() {
        let params = [(2, 3), (2, 4), (3, 5), (4, 10)];
        for (a, b) in params {
            let mut tree = ABTree::new(a, b).unwrap();
            let mut rng = StdRng::seed_from_u64(0);
            let deletion_probability = 0.3;

            // Perform a random sequence of insertions and minimum-deletions,
            // re-checking every invariant after each operation.
            for _ in 0..1000 {
                let should_delete = rng.gen_bool(deletion_probability);
                if should_delete && !tree.is_empty() {
                    let expected = tree.peek_min().copied().unwrap();
                    assert_eq!(tree.delete_min(), Ok(expected));
                } else {
                    tree.insert(rng.gen_range(0..10_000));
                }
                tree.check_invariants();
            }
        }
    }
}
