/// Category tag for a named feature. The wire encoding is a nibble,
/// so the vocabulary is closed; tags outside it map to `Unspecified`
/// rather than being dropped or misfiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Street,
    Airport,
    TrainStation,
    BusStop,
    FerryTerminal,
    University,
    Museum,
    CivicBuilding,
    Sight,
    City,
    Country,
    Unspecified,
}

impl Kind {
    /// Parse a CSV `kind` tag (case-insensitive, surrounding
    /// whitespace ignored).
    pub fn from_tag(tag: &str) -> Kind {
        match tag.trim().to_lowercase().as_str() {
            "street" => Kind::Street,
            "airport" => Kind::Airport,
            "train_station" => Kind::TrainStation,
            "bus_stop" => Kind::BusStop,
            "ferry_terminal" => Kind::FerryTerminal,
            "university" => Kind::University,
            "museum" => Kind::Museum,
            "civic_building" => Kind::CivicBuilding,
            "sight" => Kind::Sight,
            "city" => Kind::City,
            "country" => Kind::Country,
            _ => Kind::Unspecified,
        }
    }

    /// Wire value; always fits in 4 bits.
    pub fn as_nibble(self) -> u8 {
        match self {
            Kind::Street => 0,
            Kind::Airport => 1,
            Kind::TrainStation => 2,
            Kind::BusStop => 3,
            Kind::FerryTerminal => 4,
            Kind::University => 5,
            Kind::Museum => 6,
            Kind::CivicBuilding => 7,
            Kind::Sight => 8,
            Kind::City => 9,
            Kind::Country => 10,
            Kind::Unspecified => 15,
        }
    }
}

/// The sole terminal value stored in the trie: one located, kinded
/// occurrence of a name. `node_idx` and `city_idx` point into the
/// shard's node and city name tables; index 0 is the reserved empty
/// string meaning "no node/city".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationEntry {
    pub lon: f64,
    pub lat: f64,
    pub node_idx: u32,
    pub city_idx: u32,
    pub kind: u8,
}

impl LocationEntry {
    /// Full-tuple dedup identity; float identity is by bit pattern.
    pub(crate) fn dedup_key(&self) -> (u64, u64, u32, u32, u8) {
        (
            self.lon.to_bits(),
            self.lat.to_bits(),
            self.node_idx,
            self.city_idx,
            self.kind,
        )
    }

    pub(crate) fn as_tuple(&self) -> (f64, f64, u32, u32, u8) {
        (self.lon, self.lat, self.node_idx, self.city_idx, self.kind)
    }
}
