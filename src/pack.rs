use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use serde::Serialize;

use crate::codec::{check_scale, encode_coordinate, write_varint};
use crate::location::LocationEntry;
use crate::louds;
use crate::names::{encode_prefix_table, reindex_names};
use crate::shard::ShardPayload;
use crate::trie::TrieNode;

/*
Packed shard layout (all multi-byte integers little-endian):

  magic         : 4 bytes 'S','T','R','I'
  version       : 1 byte
  scale         : 3 bytes unsigned
  node_table    : front-coded name table
  city_table    : front-coded name table
  node_count    : varint
  bit_count     : varint
  louds_bits    : ceil(bit_count / 8) bytes
  edge_count    : varint
  edge_labels   : edge_count x (varint len, len bytes)
  per_node_vals : per node: varint count, then per value
                  3B signed lon, 3B signed lat,
                  varint node_idx, varint city_idx;
                  kind nibbles pack two per byte inline,
                  the trailing odd nibble flushes with a
                  zero high nibble after the last node
*/

/// Leading magic of every packed shard file.
pub const MAGIC: [u8; 4] = *b"STRI";
/// Format version byte following the magic.
pub const FORMAT_VERSION: u8 = 11;
/// Default fixed-point scale (1e-4 degree resolution).
pub const DEFAULT_SCALE: u32 = 10_000;

/// Output flavours. `Json` and `Msgpack` are uncompressed structural
/// dumps meant for inspection and tests; `Packed` is the shippable
/// binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Msgpack,
    Packed,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Msgpack => "msgpack",
            OutputFormat::Packed => "packed",
        }
    }
}

/// Structural-dump shape shared by the json and msgpack formats.
#[derive(Serialize)]
struct DumpPayload<'a> {
    locations: Vec<(f64, f64, u32, u32, u8)>,
    city_place_nodes: &'a [String],
    city_place_cities: &'a [String],
    trie: &'a TrieNode,
}

impl<'a> DumpPayload<'a> {
    fn new(payload: &'a ShardPayload) -> Self {
        Self {
            locations: payload.locations.iter().map(|entry| entry.as_tuple()).collect(),
            city_place_nodes: &payload.node_names,
            city_place_cities: &payload.city_names,
            trie: &payload.trie,
        }
    }
}

/// Serialise one completed shard in the requested format.
pub fn write_payload(payload: &ShardPayload, format: OutputFormat, scale: u32) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_vec(&DumpPayload::new(payload))?),
        OutputFormat::Msgpack => Ok(rmp_serde::to_vec_named(&DumpPayload::new(payload))?),
        OutputFormat::Packed => pack(payload, scale),
    }
}

/// Kind nibbles pack two to a byte in value-emission order; the
/// trailing odd nibble flushes with a zero high nibble.
#[derive(Debug, Default)]
struct NibblePacker {
    pending: Option<u8>,
}

impl NibblePacker {
    fn push(&mut self, out: &mut Vec<u8>, kind: u8) {
        let nibble = kind & 0x0F;
        match self.pending.take() {
            None => self.pending = Some(nibble),
            Some(low) => out.push(low | (nibble << 4)),
        }
    }

    fn flush(&mut self, out: &mut Vec<u8>) {
        if let Some(low) = self.pending.take() {
            out.push(low);
        }
    }
}

/// Assemble the packed byte stream for one shard: header, reindexed
/// front-coded name tables, LOUDS arrays, edge labels, and per-node
/// value blocks. Decodable in a single forward pass.
pub fn pack(payload: &ShardPayload, scale: u32) -> Result<Vec<u8>> {
    check_scale(scale)?;

    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.push(FORMAT_VERSION);
    out.write_u24::<LittleEndian>(scale)?;

    let (node_names, node_map) = reindex_names(&payload.node_names);
    let (city_names, city_map) = reindex_names(&payload.city_names);
    encode_prefix_table(&node_names, &mut out);
    encode_prefix_table(&city_names, &mut out);

    let remapped: Vec<LocationEntry> = payload
        .locations
        .iter()
        .map(|entry| LocationEntry {
            node_idx: node_map[entry.node_idx as usize],
            city_idx: city_map[entry.city_idx as usize],
            ..*entry
        })
        .collect();

    let louds = louds::encode(&payload.trie);
    write_varint(&mut out, louds.node_count as u64);
    write_varint(&mut out, louds.bit_count as u64);
    out.extend_from_slice(&louds.bits);
    write_varint(&mut out, louds.edge_count as u64);
    for label in &louds.edge_labels {
        write_varint(&mut out, label.len() as u64);
        out.extend_from_slice(label);
    }

    let mut kinds = NibblePacker::default();
    for values in &louds.values_per_node {
        write_varint(&mut out, values.len() as u64);
        for &value in values {
            let entry = &remapped[value as usize];
            let lon = encode_coordinate(entry.lon, scale)?;
            let lat = encode_coordinate(entry.lat, scale)?;
            out.write_i24::<LittleEndian>(lon)?;
            out.write_i24::<LittleEndian>(lat)?;
            write_varint(&mut out, u64::from(entry.node_idx));
            write_varint(&mut out, u64::from(entry.city_idx));
            kinds.push(&mut out, entry.kind);
        }
    }
    kinds.flush(&mut out);

    Ok(out)
}
