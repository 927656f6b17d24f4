#![doc = "Packed street-name trie builder: turns a CSV of named"]
#![doc = "geographic features into self-contained binary index shards."]

pub mod codec;
pub mod countries;
pub mod fs;
pub mod input;
pub mod location;
pub mod louds;
pub mod names;
pub mod normalize;
pub mod pack;
pub mod shard;
pub mod trie;

#[doc(inline)]
pub use countries::{load_countries, Country};

#[doc(inline)]
pub use fs::{ensure_dir_exists, write_atomic};

#[doc(inline)]
pub use input::{find_default_csv, read_rows, InputRow};

#[doc(inline)]
pub use location::{Kind, LocationEntry};

#[doc(inline)]
pub use normalize::{normalize_name, shard_key_for_name};

#[doc(inline)]
pub use pack::{pack, write_payload, OutputFormat, DEFAULT_SCALE, FORMAT_VERSION, MAGIC};

#[doc(inline)]
pub use shard::{ShardBuilder, ShardPayload, ShardSet};

#[doc(inline)]
pub use trie::TrieNode;
