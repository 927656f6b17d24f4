use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::countries::Country;
use crate::input::InputRow;
use crate::location::{Kind, LocationEntry};
use crate::names::NameTable;
use crate::normalize::shard_key_for_name;
use crate::trie::TrieNode;

/// Working state for one shard: its trie, location vector, name
/// tables, and the dedup maps backing them. Builders are fully
/// independent of each other (no shared tables, no shared trie) and
/// `Send`, so a driver may fan completed builders out across threads.
#[derive(Debug, Default)]
pub struct ShardBuilder {
    locations: Vec<LocationEntry>,
    location_index: AHashMap<(u64, u64, u32, u32, u8), u32>,
    node_names: NameTable,
    city_names: NameTable,
    trie: TrieNode,
}

impl ShardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one CSV row.
    pub fn insert_row(&mut self, row: &InputRow) {
        let node_idx = self.node_names.intern(&row.node);
        let city_idx = self.city_names.intern(&row.city);
        let entry = LocationEntry {
            lon: row.lon,
            lat: row.lat,
            node_idx,
            city_idx,
            kind: row.kind.as_nibble(),
        };
        self.add_location(&row.name, entry);
    }

    /// Add the country entry reachable via the country's name.
    pub(crate) fn insert_country_name(&mut self, country: &Country) {
        let entry = self.country_entry(country);
        self.add_location(&country.name, entry);
    }

    /// Add the country entry reachable via its ISO code. Callers only
    /// route here when the code is non-empty.
    pub(crate) fn insert_country_code(&mut self, country: &Country) {
        let entry = self.country_entry(country);
        self.add_location(&country.code, entry);
    }

    fn country_entry(&mut self, country: &Country) -> LocationEntry {
        let node_idx = self.node_names.intern(&country.code);
        let city_idx = self.city_names.intern(&country.name);
        LocationEntry {
            lon: country.lon,
            lat: country.lat,
            node_idx,
            city_idx,
            kind: Kind::Country.as_nibble(),
        }
    }

    /// Dedup `entry` by full-tuple identity and hang its index off
    /// the trie under `name`. Repeated identical inserts keep
    /// appending the same index, preserving multiplicity.
    fn add_location(&mut self, name: &str, entry: LocationEntry) {
        if name.is_empty() {
            return;
        }
        let key = entry.dedup_key();
        let index = match self.location_index.get(&key) {
            Some(&index) => index,
            None => {
                let index = self.locations.len() as u32;
                self.location_index.insert(key, index);
                self.locations.push(entry);
                index
            }
        };
        self.trie.insert(name, index);
    }

    #[inline]
    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    #[inline]
    pub fn node_name_count(&self) -> usize {
        self.node_names.len()
    }

    #[inline]
    pub fn city_name_count(&self) -> usize {
        self.city_names.len()
    }

    /// Compress the trie and hand the shard over for serialisation.
    /// The dedup maps die here; the payload is read-only from now on.
    pub fn finish(self) -> ShardPayload {
        ShardPayload {
            locations: self.locations,
            node_names: self.node_names.into_names(),
            city_names: self.city_names.into_names(),
            trie: self.trie.compress(),
        }
    }
}

/// A completed shard ready for [`crate::pack::write_payload`].
#[derive(Debug)]
pub struct ShardPayload {
    pub locations: Vec<LocationEntry>,
    pub node_names: Vec<String>,
    pub city_names: Vec<String>,
    pub trie: TrieNode,
}

/// All per-shard builders, keyed by shard key and created lazily on
/// the first routed row. With `prefix_len == 0` sharding is disabled:
/// a single builder keyed `""` receives every row and no row is
/// dropped for lacking a shard key.
#[derive(Debug)]
pub struct ShardSet {
    prefix_len: usize,
    shards: BTreeMap<String, ShardBuilder>,
}

impl ShardSet {
    pub fn new(prefix_len: usize) -> Self {
        let mut shards = BTreeMap::new();
        if prefix_len == 0 {
            shards.insert(String::new(), ShardBuilder::new());
        }
        Self { prefix_len, shards }
    }

    fn route(&mut self, name: &str) -> Option<&mut ShardBuilder> {
        let key = if self.prefix_len == 0 {
            String::new()
        } else {
            shard_key_for_name(name, self.prefix_len)?
        };
        Some(self.shards.entry(key).or_default())
    }

    /// Route `row` into its shard; rows whose name yields no shard
    /// key are dropped silently.
    pub fn insert_row(&mut self, row: &InputRow) {
        if let Some(shard) = self.route(&row.name) {
            shard.insert_row(row);
        }
    }

    /// Inject one auxiliary country. The name entry routes by the
    /// name's shard key and the code entry by the code's, so each is
    /// findable in the shard a reader would search.
    pub fn insert_country(&mut self, country: &Country) {
        if let Some(shard) = self.route(&country.name) {
            shard.insert_country_name(country);
        }
        if !country.code.is_empty() {
            if let Some(shard) = self.route(&country.code) {
                shard.insert_country_code(country);
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    /// Shard keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.shards.keys().map(String::as_str)
    }

    /// Consume the set, yielding builders in shard-key order.
    pub fn into_builders(self) -> impl Iterator<Item = (String, ShardBuilder)> {
        self.shards.into_iter()
    }
}
