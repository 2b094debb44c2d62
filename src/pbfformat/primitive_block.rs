use crate::elements::{Info, Node, Relation, Tag, Way};
use crate::error::{Error, Result};
use crate::pbfformat::dense::DenseNodes;
use crate::pbfformat::string_table::StringTable;
use crate::pbfformat::write_pbf;
use crate::pbfformat::{
    lonlat2int, WriterOptions, MAX_ENTITIES_PER_BLOCK, MAX_UNCOMPRESSED_BLOB_SIZE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    Unset,
    Dense,
    Nodes,
    Ways,
    Relations,
}

// The block is filled to about 95% and then written out, which leaves
// enough headroom for the string table (typically another 0.1 to 0.3%).
const MAX_USED_BLOB_SIZE: usize = MAX_UNCOMPRESSED_BLOB_SIZE / 100 * 95;

fn check_info(info: &Option<Info>, opts: &WriterOptions) -> Result<()> {
    match info {
        Some(info) => {
            if opts.add_metadata.version && (info.version < 0 || info.version > i32::MAX as i64) {
                return Err(Error::Encoding(format!(
                    "version {} out of range",
                    info.version
                )));
            }
            if opts.add_metadata.uid && (info.user_id < 0 || info.user_id > i32::MAX as i64) {
                return Err(Error::Encoding(format!(
                    "user id {} out of range",
                    info.user_id
                )));
            }
            Ok(())
        }
        None => Ok(()),
    }
}

// tag key/val string ids, then the optional Info sub-message; shared by the
// node, way and relation encoders
fn pack_meta(
    tags: &[Tag],
    info: &Option<Info>,
    res: &mut Vec<u8>,
    strings: &mut StringTable,
    opts: &WriterOptions,
) {
    if !tags.is_empty() {
        write_pbf::pack_data(
            res,
            2,
            &write_pbf::pack_int(tags.iter().map(|t| strings.add(&t.key) as u64)),
        );
        write_pbf::pack_data(
            res,
            3,
            &write_pbf::pack_int(tags.iter().map(|t| strings.add(&t.val) as u64)),
        );
    }

    if opts.add_metadata.any() || opts.add_visible_flag {
        let default_info = Info::new();
        let info = match info {
            Some(info) => info,
            None => &default_info,
        };

        let mut pk = Vec::with_capacity(50);
        if opts.add_metadata.version {
            write_pbf::pack_value(&mut pk, 1, info.version as u64);
        }
        if opts.add_metadata.timestamp {
            write_pbf::pack_value(&mut pk, 2, info.timestamp as u64);
        }
        if opts.add_metadata.changeset {
            write_pbf::pack_value(&mut pk, 3, info.changeset as u64);
        }
        if opts.add_metadata.uid {
            write_pbf::pack_value(&mut pk, 4, info.user_id as u64);
        }
        if opts.add_metadata.user {
            write_pbf::pack_value(&mut pk, 5, strings.add(&info.user) as u64);
        }
        if opts.add_visible_flag {
            write_pbf::pack_value(&mut pk, 6, if info.visible { 1 } else { 0 });
        }
        write_pbf::pack_data(res, 4, &pk);
    }
}

// The working block: at most one group of a single entity kind plus the
// block's string table. Entities are appended until can_add says no, at
// which point the caller serializes the block and resets it.
pub struct PrimitiveBlock {
    group_type: GroupType,
    count: usize,
    group_data: Vec<u8>,
    string_table: StringTable,
    dense: Option<DenseNodes>,
}

impl PrimitiveBlock {
    pub fn new() -> PrimitiveBlock {
        PrimitiveBlock {
            group_type: GroupType::Unset,
            count: 0,
            group_data: Vec::new(),
            string_table: StringTable::new(),
            dense: None,
        }
    }

    pub fn group_type(&self) -> GroupType {
        self.group_type
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn size(&self) -> usize {
        self.group_data.len()
            + self.string_table.size()
            + match &self.dense {
                Some(d) => d.size(),
                None => 0,
            }
    }

    pub fn can_add(&self, group_type: GroupType) -> bool {
        if group_type != self.group_type {
            return false;
        }
        if self.count >= MAX_ENTITIES_PER_BLOCK {
            return false;
        }
        self.size() < MAX_USED_BLOB_SIZE
    }

    pub fn reset(&mut self, group_type: GroupType) {
        self.group_data.clear();
        self.string_table.clear();
        self.dense = None;
        self.group_type = group_type;
        self.count = 0;
    }

    pub fn add_dense_node(&mut self, node: &Node, opts: &WriterOptions) -> Result<()> {
        check_info(&node.info, opts)?;

        if self.dense.is_none() {
            self.dense = Some(DenseNodes::new());
        }
        self.dense
            .as_mut()
            .unwrap()
            .add_node(node, &mut self.string_table, opts);
        self.count += 1;
        Ok(())
    }

    pub fn add_node(&mut self, node: &Node, opts: &WriterOptions) -> Result<()> {
        check_info(&node.info, opts)?;

        let mut msg = Vec::with_capacity(70 + 10 * node.tags.len());
        write_pbf::pack_value(&mut msg, 1, write_pbf::zig_zag(node.id));
        pack_meta(
            &node.tags,
            &node.info,
            &mut msg,
            &mut self.string_table,
            opts,
        );
        write_pbf::pack_value(&mut msg, 8, write_pbf::zig_zag(lonlat2int(node.lat)));
        write_pbf::pack_value(&mut msg, 9, write_pbf::zig_zag(lonlat2int(node.lon)));

        write_pbf::pack_data(&mut self.group_data, 1, &msg);
        self.count += 1;
        Ok(())
    }

    pub fn add_way(&mut self, way: &Way, opts: &WriterOptions) -> Result<()> {
        check_info(&way.info, opts)?;

        let mut msg = Vec::with_capacity(70 + 10 * way.tags.len() + 5 * way.refs.len());
        write_pbf::pack_value(&mut msg, 1, way.id as u64);
        pack_meta(&way.tags, &way.info, &mut msg, &mut self.string_table, opts);

        if !way.refs.is_empty() {
            write_pbf::pack_data(
                &mut msg,
                8,
                &write_pbf::pack_delta_int(way.refs.iter().map(|r| r.id)),
            );

            if opts.locations_on_ways {
                // a missing location is written as (0, 0); readers skip the
                // entry when ref is 0
                write_pbf::pack_data(
                    &mut msg,
                    10,
                    &write_pbf::pack_delta_int(way.refs.iter().map(|r| match r.location {
                        Some((lon, _)) => lonlat2int(lon),
                        None => 0,
                    })),
                );
                write_pbf::pack_data(
                    &mut msg,
                    9,
                    &write_pbf::pack_delta_int(way.refs.iter().map(|r| match r.location {
                        Some((_, lat)) => lonlat2int(lat),
                        None => 0,
                    })),
                );
            }
        }

        write_pbf::pack_data(&mut self.group_data, 3, &msg);
        self.count += 1;
        Ok(())
    }

    pub fn add_relation(&mut self, rel: &Relation, opts: &WriterOptions) -> Result<()> {
        check_info(&rel.info, opts)?;

        let mut msg = Vec::with_capacity(70 + 10 * rel.tags.len() + 10 * rel.members.len());
        write_pbf::pack_value(&mut msg, 1, rel.id as u64);
        pack_meta(&rel.tags, &rel.info, &mut msg, &mut self.string_table, opts);

        if !rel.members.is_empty() {
            let strings = &mut self.string_table;
            let roles =
                write_pbf::pack_int(rel.members.iter().map(|m| strings.add(&m.role) as u64));
            write_pbf::pack_data(&mut msg, 8, &roles);
            write_pbf::pack_data(
                &mut msg,
                9,
                &write_pbf::pack_delta_int(rel.members.iter().map(|m| m.mem_ref)),
            );
            write_pbf::pack_data(
                &mut msg,
                10,
                &write_pbf::pack_int(rel.members.iter().map(|m| m.mem_type.as_int())),
            );
        }

        write_pbf::pack_data(&mut self.group_data, 4, &msg);
        self.count += 1;
        Ok(())
    }

    // string table first, then the single group
    pub fn serialize(&mut self, opts: &WriterOptions) -> Vec<u8> {
        let mut group = std::mem::take(&mut self.group_data);
        if let Some(dense) = &self.dense {
            write_pbf::pack_data(&mut group, 2, &dense.serialize(opts));
        }

        let strings = self.string_table.pack();

        let mut res = Vec::with_capacity(
            write_pbf::data_length(1, strings.len()) + write_pbf::data_length(2, group.len()),
        );
        write_pbf::pack_data(&mut res, 1, &strings);
        write_pbf::pack_data(&mut res, 2, &group);
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementType, Member, NodeRef};
    use crate::pbfformat::read_pbf::{
        read_delta_packed_int, read_packed_int, IterTags, PbfTag,
    };
    use crate::pbfformat::MetadataOptions;

    fn no_meta_opts() -> WriterOptions {
        let mut opts = WriterOptions::new();
        opts.add_metadata = MetadataOptions::none();
        opts
    }

    fn parse_block(data: &[u8]) -> (Vec<String>, Vec<u8>) {
        let mut strings = Vec::new();
        let mut group = Vec::new();
        for t in IterTags::new(data) {
            match t {
                PbfTag::Data(1, d) => {
                    for s in IterTags::new(d) {
                        match s {
                            PbfTag::Data(1, e) => {
                                strings.push(String::from_utf8(e.to_vec()).unwrap())
                            }
                            _ => panic!("unexpected string table entry {:?}", s),
                        }
                    }
                }
                PbfTag::Data(2, d) => group = d.to_vec(),
                _ => panic!("unexpected block field {:?}", t),
            }
        }
        (strings, group)
    }

    #[test]
    fn test_can_add_type_and_count() {
        let opts = no_meta_opts();
        let mut block = PrimitiveBlock::new();
        assert!(!block.can_add(GroupType::Dense));

        block.reset(GroupType::Dense);
        assert!(block.can_add(GroupType::Dense));
        assert!(!block.can_add(GroupType::Ways));

        for i in 0..MAX_ENTITIES_PER_BLOCK {
            assert!(block.can_add(GroupType::Dense));
            block
                .add_dense_node(&Node::new(i as i64 + 1), &opts)
                .unwrap();
        }
        assert_eq!(block.count(), 8000);
        assert!(!block.can_add(GroupType::Dense));
    }

    #[test]
    fn test_version_range_check() {
        let opts = WriterOptions::new();
        let mut block = PrimitiveBlock::new();
        block.reset(GroupType::Dense);

        let mut n = Node::new(1);
        let mut info = Info::new();
        info.version = (i32::MAX as i64) + 1;
        n.info = Some(info);
        assert!(block.add_dense_node(&n, &opts).is_err());
        // the failed node is not committed
        assert_eq!(block.count(), 0);

        // with metadata disabled the same node passes
        let opts = no_meta_opts();
        assert!(block.add_dense_node(&n, &opts).is_ok());
    }

    #[test]
    fn test_pack_way() {
        let opts = no_meta_opts();
        let mut block = PrimitiveBlock::new();
        block.reset(GroupType::Ways);

        let mut w = Way::new(10);
        w.tags.push(Tag::new("highway", "residential"));
        for r in [100, 101, 103] {
            w.refs.push(NodeRef::new(r));
        }
        block.add_way(&w, &opts).unwrap();

        let data = block.serialize(&opts);
        let (strings, group) = parse_block(&data);
        assert_eq!(strings, vec!["", "highway", "residential"]);

        let mut way_data = Vec::new();
        for t in IterTags::new(&group) {
            match t {
                PbfTag::Data(3, d) => way_data = d.to_vec(),
                _ => panic!("expected a ways group, got {:?}", t),
            }
        }

        let mut id = 0;
        let mut keys = Vec::new();
        let mut vals = Vec::new();
        let mut refs = Vec::new();
        for t in IterTags::new(&way_data) {
            match t {
                PbfTag::Value(1, v) => id = v,
                PbfTag::Data(2, d) => keys = read_packed_int(d),
                PbfTag::Data(3, d) => vals = read_packed_int(d),
                PbfTag::Data(8, d) => refs = read_delta_packed_int(d),
                _ => panic!("unexpected way field {:?}", t),
            }
        }
        assert_eq!(id, 10);
        assert_eq!(keys, vec![1]);
        assert_eq!(vals, vec![2]);
        assert_eq!(refs, vec![100, 101, 103]);
    }

    #[test]
    fn test_pack_way_locations() {
        let mut opts = no_meta_opts();
        opts.locations_on_ways = true;

        let mut block = PrimitiveBlock::new();
        block.reset(GroupType::Ways);

        let mut w = Way::new(1);
        w.refs.push(NodeRef::with_location(100, 2.0, 1.0));
        w.refs.push(NodeRef::new(0));
        w.refs.push(NodeRef::with_location(101, 2.5, 1.5));
        block.add_way(&w, &opts).unwrap();

        let data = block.serialize(&opts);
        let (_, group) = parse_block(&data);

        let mut lats = Vec::new();
        let mut lons = Vec::new();
        for t in IterTags::new(&group) {
            match t {
                PbfTag::Data(3, d) => {
                    for w in IterTags::new(d) {
                        match w {
                            PbfTag::Data(9, d) => lats = read_delta_packed_int(d),
                            PbfTag::Data(10, d) => lons = read_delta_packed_int(d),
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        assert_eq!(lons, vec![20000000, 0, 25000000]);
        assert_eq!(lats, vec![10000000, 0, 15000000]);
    }

    #[test]
    fn test_pack_relation() {
        let opts = no_meta_opts();
        let mut block = PrimitiveBlock::new();
        block.reset(GroupType::Relations);

        let mut r = Relation::new(7);
        r.members
            .push(Member::new("outer", ElementType::Way, 20));
        r.members
            .push(Member::new("inner", ElementType::Way, 22));
        block.add_relation(&r, &opts).unwrap();

        let data = block.serialize(&opts);
        let (strings, group) = parse_block(&data);
        assert_eq!(strings, vec!["", "outer", "inner"]);

        let mut rel_data = Vec::new();
        for t in IterTags::new(&group) {
            match t {
                PbfTag::Data(4, d) => rel_data = d.to_vec(),
                _ => panic!("expected a relations group, got {:?}", t),
            }
        }

        let mut id = 0;
        let mut roles = Vec::new();
        let mut memids = Vec::new();
        let mut types = Vec::new();
        for t in IterTags::new(&rel_data) {
            match t {
                PbfTag::Value(1, v) => id = v,
                PbfTag::Data(8, d) => roles = read_packed_int(d),
                PbfTag::Data(9, d) => memids = read_delta_packed_int(d),
                PbfTag::Data(10, d) => types = read_packed_int(d),
                _ => panic!("unexpected relation field {:?}", t),
            }
        }
        assert_eq!(id, 7);
        assert_eq!(roles, vec![1, 2]);
        assert_eq!(memids, vec![20, 22]);
        assert_eq!(types, vec![1, 1]);
    }

    #[test]
    fn test_pack_plain_node() {
        let opts = no_meta_opts();
        let mut block = PrimitiveBlock::new();
        block.reset(GroupType::Nodes);

        block
            .add_node(&Node::with_location(3, -2.0, 1.0), &opts)
            .unwrap();

        let data = block.serialize(&opts);
        let (_, group) = parse_block(&data);

        let mut node_data = Vec::new();
        for t in IterTags::new(&group) {
            match t {
                PbfTag::Data(1, d) => node_data = d.to_vec(),
                _ => panic!("expected a nodes group, got {:?}", t),
            }
        }

        let fields: Vec<PbfTag> = IterTags::new(&node_data).collect();
        assert_eq!(
            fields,
            vec![
                PbfTag::Value(1, write_pbf::zig_zag(3)),
                PbfTag::Value(8, write_pbf::zig_zag(10000000)),
                PbfTag::Value(9, write_pbf::zig_zag(-20000000)),
            ]
        );
    }

    #[test]
    fn test_reset_clears_state() {
        let opts = no_meta_opts();
        let mut block = PrimitiveBlock::new();
        block.reset(GroupType::Dense);

        let mut n = Node::new(1);
        n.tags.push(Tag::new("a", "b"));
        block.add_dense_node(&n, &opts).unwrap();
        assert!(block.size() > 0);

        block.reset(GroupType::Ways);
        assert_eq!(block.count(), 0);
        assert_eq!(block.group_type(), GroupType::Ways);
        // only the empty string survives in the string table
        let data = block.serialize(&opts);
        let (strings, group) = parse_block(&data);
        assert_eq!(strings, vec![""]);
        assert!(group.is_empty());
    }
}
