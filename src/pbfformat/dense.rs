use crate::elements::{Info, Node};
use crate::pbfformat::delta::DeltaEncoder;
use crate::pbfformat::string_table::StringTable;
use crate::pbfformat::write_pbf;
use crate::pbfformat::{lonlat2int, WriterOptions};

// Packs any number of nodes into the columnar DenseNodes representation:
// one delta-encoded array per field, and a single shared tag array where a
// zero string index terminates each node's run of key/value pairs.
pub struct DenseNodes {
    ids: Vec<i64>,

    versions: Vec<i64>,
    timestamps: Vec<i64>,
    changesets: Vec<i64>,
    uids: Vec<i64>,
    user_sids: Vec<i64>,
    visibles: Vec<bool>,

    lats: Vec<i64>,
    lons: Vec<i64>,
    tags: Vec<u64>,

    delta_id: DeltaEncoder,
    delta_timestamp: DeltaEncoder,
    delta_changeset: DeltaEncoder,
    delta_uid: DeltaEncoder,
    delta_user_sid: DeltaEncoder,
    delta_lat: DeltaEncoder,
    delta_lon: DeltaEncoder,
}

impl DenseNodes {
    pub fn new() -> DenseNodes {
        DenseNodes {
            ids: Vec::new(),
            versions: Vec::new(),
            timestamps: Vec::new(),
            changesets: Vec::new(),
            uids: Vec::new(),
            user_sids: Vec::new(),
            visibles: Vec::new(),
            lats: Vec::new(),
            lons: Vec::new(),
            tags: Vec::new(),
            delta_id: DeltaEncoder::new(),
            delta_timestamp: DeltaEncoder::new(),
            delta_changeset: DeltaEncoder::new(),
            delta_uid: DeltaEncoder::new(),
            delta_user_sid: DeltaEncoder::new(),
            delta_lat: DeltaEncoder::new(),
            delta_lon: DeltaEncoder::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    // cheap estimate for the block rollover check, not the exact footprint
    pub fn size(&self) -> usize {
        self.ids.len() * 3 * 8
    }

    pub fn add_node(&mut self, node: &Node, strings: &mut StringTable, opts: &WriterOptions) {
        self.ids.push(self.delta_id.update(node.id));

        let default_info = Info::new();
        let info = match &node.info {
            Some(info) => info,
            None => &default_info,
        };

        if opts.add_metadata.version {
            self.versions.push(info.version);
        }
        if opts.add_metadata.timestamp {
            self.timestamps
                .push(self.delta_timestamp.update(info.timestamp));
        }
        if opts.add_metadata.changeset {
            self.changesets
                .push(self.delta_changeset.update(info.changeset));
        }
        if opts.add_metadata.uid {
            self.uids.push(self.delta_uid.update(info.user_id));
        }
        if opts.add_metadata.user {
            let sid = strings.add(&info.user) as i64;
            self.user_sids.push(self.delta_user_sid.update(sid));
        }
        if opts.add_visible_flag {
            self.visibles.push(info.visible);
        }

        self.lats.push(self.delta_lat.update(lonlat2int(node.lat)));
        self.lons.push(self.delta_lon.update(lonlat2int(node.lon)));

        for t in &node.tags {
            self.tags.push(strings.add(&t.key) as u64);
            self.tags.push(strings.add(&t.val) as u64);
        }
        self.tags.push(0);
    }

    pub fn serialize(&self, opts: &WriterOptions) -> Vec<u8> {
        let ids = write_pbf::pack_sint(self.ids.iter().copied());

        let mut res = Vec::with_capacity(self.size() + 2 * self.tags.len() + 20);
        write_pbf::pack_data(&mut res, 1, &ids);

        if opts.add_metadata.any() || opts.add_visible_flag {
            let mut info = Vec::new();
            if opts.add_metadata.version {
                write_pbf::pack_data(
                    &mut info,
                    1,
                    &write_pbf::pack_int(self.versions.iter().map(|v| *v as u64)),
                );
            }
            if opts.add_metadata.timestamp {
                write_pbf::pack_data(
                    &mut info,
                    2,
                    &write_pbf::pack_sint(self.timestamps.iter().copied()),
                );
            }
            if opts.add_metadata.changeset {
                write_pbf::pack_data(
                    &mut info,
                    3,
                    &write_pbf::pack_sint(self.changesets.iter().copied()),
                );
            }
            if opts.add_metadata.uid {
                write_pbf::pack_data(
                    &mut info,
                    4,
                    &write_pbf::pack_sint(self.uids.iter().copied()),
                );
            }
            if opts.add_metadata.user {
                write_pbf::pack_data(
                    &mut info,
                    5,
                    &write_pbf::pack_sint(self.user_sids.iter().copied()),
                );
            }
            if opts.add_visible_flag {
                write_pbf::pack_data(
                    &mut info,
                    6,
                    &write_pbf::pack_bool(self.visibles.iter().copied()),
                );
            }
            write_pbf::pack_data(&mut res, 5, &info);
        }

        write_pbf::pack_data(&mut res, 8, &write_pbf::pack_sint(self.lats.iter().copied()));
        write_pbf::pack_data(&mut res, 9, &write_pbf::pack_sint(self.lons.iter().copied()));
        write_pbf::pack_data(&mut res, 10, &write_pbf::pack_int(self.tags.iter().copied()));

        res
    }
}
