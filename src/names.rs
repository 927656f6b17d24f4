use ahash::AHashMap;

use crate::codec::write_varint;

/// Deduplicating, append-only name table. Index 0 is reserved for the
/// empty string so a stored index of 0 reads as "no node/city".
#[derive(Debug)]
pub struct NameTable {
    names: Vec<String>,
    index: AHashMap<String, u32>,
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NameTable {
    pub fn new() -> Self {
        let mut index = AHashMap::new();
        index.insert(String::new(), 0);
        Self { names: vec![String::new()], index }
    }

    /// Look up `name`, appending it if unseen, and return its index.
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.names.len() as u32;
        self.index.insert(name.to_string(), idx);
        self.names.push(name.to_string());
        idx
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

/// Sort `names` alphabetically and return the sorted table together
/// with the old-index to new-index permutation callers use to rewrite
/// stored references.
pub fn reindex_names(names: &[String]) -> (Vec<String>, Vec<u32>) {
    let mut indexed: Vec<(usize, &String)> = names.iter().enumerate().collect();
    indexed.sort_by(|a, b| a.1.cmp(b.1));

    let sorted: Vec<String> = indexed.iter().map(|(_, name)| (*name).clone()).collect();
    let mut old_to_new = vec![0u32; names.len()];
    for (new_idx, (old_idx, _)) in indexed.iter().enumerate() {
        old_to_new[*old_idx] = new_idx as u32;
    }
    (sorted, old_to_new)
}

/// Emit an already-sorted name table front-coded: a varint entry
/// count, then per entry the byte length shared with the previous
/// entry, the suffix length, and the suffix bytes.
pub fn encode_prefix_table(names: &[String], out: &mut Vec<u8>) {
    write_varint(out, names.len() as u64);
    let mut prev: &[u8] = b"";
    for name in names {
        let bytes = name.as_bytes();
        let max = prev.len().min(bytes.len());
        let mut prefix_len = 0;
        while prefix_len < max && prev[prefix_len] == bytes[prefix_len] {
            prefix_len += 1;
        }
        write_varint(out, prefix_len as u64);
        write_varint(out, (bytes.len() - prefix_len) as u64);
        out.extend_from_slice(&bytes[prefix_len..]);
        prev = bytes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::read_varint;

    /// Inverse of `encode_prefix_table`, used to check the encoding.
    fn decode_prefix_table(data: &[u8], offset: &mut usize) -> Vec<String> {
        let count = read_varint(data, offset).unwrap() as usize;
        let mut names = Vec::with_capacity(count);
        let mut prev: Vec<u8> = Vec::new();
        for _ in 0..count {
            let prefix_len = read_varint(data, offset).unwrap() as usize;
            let suffix_len = read_varint(data, offset).unwrap() as usize;
            let mut bytes = prev[..prefix_len].to_vec();
            bytes.extend_from_slice(&data[*offset..*offset + suffix_len]);
            *offset += suffix_len;
            prev = bytes.clone();
            names.push(String::from_utf8(bytes).unwrap());
        }
        names
    }

    #[test]
    fn table_is_seeded_with_the_empty_string() {
        let mut table = NameTable::new();
        assert_eq!(table.len(), 1);
        assert_eq!(table.intern(""), 0);
        assert_eq!(table.names(), &[String::new()]);
    }

    #[test]
    fn intern_returns_stable_indices() {
        let mut table = NameTable::new();
        assert_eq!(table.intern("Node A"), 1);
        assert_eq!(table.intern("Node B"), 2);
        assert_eq!(table.intern("Node A"), 1);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn reindex_sorts_and_permutes() {
        let names = vec!["".to_string(), "Node B".to_string(), "Node A".to_string()];
        let (sorted, old_to_new) = reindex_names(&names);
        assert_eq!(sorted, vec!["", "Node A", "Node B"]);
        // "" stays at 0, "Node B" moves 1 -> 2, "Node A" moves 2 -> 1.
        assert_eq!(old_to_new, vec![0, 2, 1]);
    }

    #[test]
    fn front_coding_round_trips_sorted_names() {
        let names: Vec<String> = ["", "Bahnhofplatz", "Bahnhofstrasse", "Bahnhofweg", "Seestrasse"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut out = Vec::new();
        encode_prefix_table(&names, &mut out);

        let mut offset = 0;
        assert_eq!(decode_prefix_table(&out, &mut offset), names);
        assert_eq!(offset, out.len());
    }

    #[test]
    fn front_coding_shares_prefixes() {
        let names: Vec<String> =
            ["Bahnhofstrasse", "Bahnhofweg"].iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        encode_prefix_table(&names, &mut out);

        let mut offset = 0;
        let count = read_varint(&out, &mut offset).unwrap();
        assert_eq!(count, 2);
        // First entry shares nothing.
        assert_eq!(read_varint(&out, &mut offset).unwrap(), 0);
        let suffix_len = read_varint(&out, &mut offset).unwrap() as usize;
        assert_eq!(&out[offset..offset + suffix_len], b"Bahnhofstrasse");
        offset += suffix_len;
        // Second entry reuses the 7-byte "Bahnhof" prefix.
        assert_eq!(read_varint(&out, &mut offset).unwrap(), 7);
        let suffix_len = read_varint(&out, &mut offset).unwrap() as usize;
        assert_eq!(&out[offset..offset + suffix_len], b"weg");
    }

    #[test]
    fn front_coding_of_multibyte_names_counts_bytes() {
        let names: Vec<String> =
            ["Zürichbergstrasse", "Zürichstrasse"].iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        encode_prefix_table(&names, &mut out);

        let mut offset = 0;
        assert_eq!(decode_prefix_table(&out, &mut offset), names);
    }
}
