use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;

/// One patricia-trie node: byte-string edges to children plus the
/// list of terminal values (indices into the shard's location
/// vector). Terminal lists keep insertion order and may repeat an
/// index when identical rows were inserted more than once.
#[derive(Debug, Default, Clone)]
pub struct TrieNode {
    edges: BTreeMap<Vec<u8>, TrieNode>,
    values: SmallVec<[u32; 2]>,
}

impl TrieNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` one byte at a time and append `value` to the
    /// terminal list of the final node. Keys are the UTF-8 bytes of
    /// the original name, not the normalised one.
    pub fn insert(&mut self, key: &str, value: u32) {
        let mut node = self;
        for &byte in key.as_bytes() {
            node = node.edges.entry(vec![byte]).or_default();
        }
        node.values.push(value);
    }

    /// Collapse every valueless single-child chain below this node
    /// into one edge carrying the concatenated label (post-order).
    /// After compression sibling labels are pairwise distinct and
    /// share no first byte; labels may split inside a multi-byte code
    /// point, which is fine for the byte-oriented emitters.
    pub fn compress(self) -> TrieNode {
        let mut edges = BTreeMap::new();
        for (mut label, child) in self.edges {
            let mut child = child.compress();
            while child.values.is_empty() && child.edges.len() == 1 {
                let Some((next, grandchild)) = child.edges.pop_first() else {
                    break;
                };
                label.extend_from_slice(&next);
                child = grandchild;
            }
            edges.insert(label, child);
        }
        TrieNode { edges, values: self.values }
    }

    /// Outgoing edges in byte-lexicographic label order.
    pub fn edges(&self) -> impl Iterator<Item = (&[u8], &TrieNode)> {
        self.edges.iter().map(|(label, child)| (label.as_slice(), child))
    }

    /// Child reached by an exact edge label, if any.
    pub fn child(&self, label: &[u8]) -> Option<&TrieNode> {
        self.edges.get(label)
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn values(&self) -> &[u32] {
        self.values.as_slice()
    }
}

// Structural-dump shape: a map of edge label to child, with the
// terminal value list under the reserved "\0" key. Labels that split
// a code point decode lossily; the dump formats are for inspection
// and tests only.
impl Serialize for TrieNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let terminal = usize::from(!self.values.is_empty());
        let mut map = serializer.serialize_map(Some(self.edges.len() + terminal))?;
        for (label, child) in &self.edges {
            map.serialize_entry(&String::from_utf8_lossy(label), child)?;
        }
        if !self.values.is_empty() {
            map.serialize_entry("\0", &self.values[..])?;
        }
        map.end()
    }
}
