use crate::node::Node;

/// Slot arena owning every node of a tree. Node identity is the slot index;
/// slots vacated by merges and root collapse are recycled.
pub struct Arena<K> {
    free_slots: Vec<usize>,
    pub nodes: Vec<Node<K>>,
}

impl<K> Arena<K> {
    #[must_use]
    pub fn new() -> Self {
        Arena {
            free_slots: Vec::new(),
            nodes: Vec::new(),
        }
    }

    // Allocate or reuse a slot for the node.
    pub fn insert(&mut self, mut node: Node<K>) -> usize {
        if let Some(slot_id) = self.free_slots.pop() {
            node.slot_id = slot_id;
            self.nodes[slot_id] = node;
            slot_id
        } else {
            let slot_id = self.nodes.len();
            node.slot_id = slot_id;
            self.nodes.push(node);
            slot_id
        }
    }

    // Vacate a slot, dropping the node's contents.
    pub fn remove(&mut self, slot_id: usize) {
        self.nodes[slot_id] = Node::leaf();
        self.free_slots.push(slot_id);
    }
}

impl<K> Default for Arena<K> {
    fn default() -> Self {
        Self::new()
    }
}
