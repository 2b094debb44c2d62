use crate::elements::Bbox;
use crate::error::{Error, Result};
use crate::pbfformat::write_pbf;
use crate::pbfformat::{WriterOptions, LONLAT_RESOLUTION};
use crate::utils::parse_timestamp;

// File-level metadata going into the OSMHeader blob.
#[derive(Debug, Clone)]
pub struct Header {
    pub writer: String,
    pub bbox: Vec<Bbox>,
    pub sorting: String,
    pub replication_timestamp: String,
    pub replication_sequence_number: String,
    pub replication_base_url: String,
    pub multiple_object_versions: bool,
}

impl Header {
    pub fn new() -> Header {
        Header {
            writer: String::from("osmpbf-writer"),
            bbox: Vec::new(),
            sorting: String::new(),
            replication_timestamp: String::new(),
            replication_sequence_number: String::new(),
            replication_base_url: String::new(),
            multiple_object_versions: false,
        }
    }

    pub fn with_bbox(bbox: Bbox) -> Header {
        let mut h = Header::new();
        h.bbox.push(bbox);
        h
    }
}

// header bbox coordinates are plain nanodegrees, not scaled by granularity
fn pack_bbox(bbox: &Bbox) -> Vec<u8> {
    let res_f = LONLAT_RESOLUTION as f64;
    let mut res = Vec::with_capacity(30);
    write_pbf::pack_value(&mut res, 1, write_pbf::zig_zag((bbox.minlon * res_f) as i64));
    write_pbf::pack_value(&mut res, 2, write_pbf::zig_zag((bbox.maxlon * res_f) as i64));
    write_pbf::pack_value(&mut res, 3, write_pbf::zig_zag((bbox.maxlat * res_f) as i64));
    write_pbf::pack_value(&mut res, 4, write_pbf::zig_zag((bbox.minlat * res_f) as i64));
    res
}

pub fn make_header_block(header: &Header, opts: &WriterOptions) -> Result<Vec<u8>> {
    let mut res = Vec::new();

    if !header.bbox.is_empty() {
        let mut bbox = header.bbox[0].clone();
        for b in &header.bbox[1..] {
            bbox.expand(b);
        }
        write_pbf::pack_data(&mut res, 1, &pack_bbox(&bbox));
    }

    write_pbf::pack_data(&mut res, 4, b"OsmSchema-V0.6");
    if opts.dense_nodes {
        write_pbf::pack_data(&mut res, 4, b"DenseNodes");
    }
    if opts.add_historical_information_flag {
        write_pbf::pack_data(&mut res, 4, b"HistoricalInformation");
    }

    if opts.locations_on_ways {
        write_pbf::pack_data(&mut res, 5, b"LocationsOnWays");
    }
    if header.sorting == "Type_then_ID" {
        write_pbf::pack_data(&mut res, 5, b"Sort.Type_then_ID");
    }

    write_pbf::pack_data(&mut res, 16, header.writer.as_bytes());

    if !header.replication_timestamp.is_empty() {
        let ts = parse_timestamp(&header.replication_timestamp)?;
        write_pbf::pack_value(&mut res, 32, ts as u64);
    }
    if !header.replication_sequence_number.is_empty() {
        let seq: i64 = match header.replication_sequence_number.parse() {
            Ok(v) => v,
            Err(_) => {
                return Err(Error::Encoding(format!(
                    "replication sequence number '{}' is not an integer",
                    header.replication_sequence_number
                )));
            }
        };
        write_pbf::pack_value(&mut res, 33, seq as u64);
    }
    if !header.replication_base_url.is_empty() {
        write_pbf::pack_data(&mut res, 34, header.replication_base_url.as_bytes());
    }

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pbfformat::read_pbf::{un_zig_zag, IterTags, PbfTag};

    fn features(data: &[u8], field: u64) -> Vec<String> {
        IterTags::new(data)
            .filter_map(|t| match t {
                PbfTag::Data(f, d) if f == field => {
                    Some(String::from_utf8(d.to_vec()).unwrap())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_default_header() {
        let data = make_header_block(&Header::new(), &WriterOptions::new()).unwrap();

        assert_eq!(features(&data, 4), vec!["OsmSchema-V0.6", "DenseNodes"]);
        assert!(features(&data, 5).is_empty());
        assert_eq!(features(&data, 16), vec!["osmpbf-writer"]);
        // no bbox, no replication info
        for t in IterTags::new(&data) {
            match t {
                PbfTag::Data(1, _) => panic!("unexpected bbox"),
                PbfTag::Value(32, _) | PbfTag::Value(33, _) | PbfTag::Data(34, _) => {
                    panic!("unexpected replication field")
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_feature_flags() {
        let mut opts = WriterOptions::new();
        opts.dense_nodes = false;
        opts.add_historical_information_flag = true;
        opts.locations_on_ways = true;

        let mut header = Header::new();
        header.sorting = String::from("Type_then_ID");

        let data = make_header_block(&header, &opts).unwrap();
        assert_eq!(
            features(&data, 4),
            vec!["OsmSchema-V0.6", "HistoricalInformation"]
        );
        assert_eq!(
            features(&data, 5),
            vec!["LocationsOnWays", "Sort.Type_then_ID"]
        );
    }

    #[test]
    fn test_bbox_union_nanodegrees() {
        let mut header = Header::new();
        header.bbox.push(Bbox::new(-1.0, -2.0, 3.0, 4.0));
        header.bbox.push(Bbox::new(-5.0, 0.0, 1.0, 6.0));

        let data = make_header_block(&header, &WriterOptions::new()).unwrap();

        let mut bbox = Vec::new();
        for t in IterTags::new(&data) {
            match t {
                PbfTag::Data(1, d) => {
                    for b in IterTags::new(d) {
                        match b {
                            PbfTag::Value(_, v) => bbox.push(un_zig_zag(v)),
                            _ => panic!("unexpected bbox field {:?}", b),
                        }
                    }
                }
                _ => {}
            }
        }
        // left, right, top, bottom
        assert_eq!(
            bbox,
            vec![-5000000000, 3000000000, 6000000000, -2000000000]
        );
    }

    #[test]
    fn test_planet_bbox() {
        let header = Header::with_bbox(Bbox::planet());
        let data = make_header_block(&header, &WriterOptions::new()).unwrap();

        let mut left = None;
        for t in IterTags::new(&data) {
            if let PbfTag::Data(1, d) = t {
                for b in IterTags::new(d) {
                    if let PbfTag::Value(1, v) = b {
                        left = Some(un_zig_zag(v));
                    }
                }
            }
        }
        assert_eq!(left, Some(-180000000000));
    }

    #[test]
    fn test_replication_fields() {
        let mut header = Header::new();
        header.replication_timestamp = String::from("1970-01-02T00:00:00Z");
        header.replication_sequence_number = String::from("12345");
        header.replication_base_url =
            String::from("https://planet.osm.org/replication/minute/");

        let data = make_header_block(&header, &WriterOptions::new()).unwrap();

        let mut ts = None;
        let mut seq = None;
        let mut url = None;
        for t in IterTags::new(&data) {
            match t {
                PbfTag::Value(32, v) => ts = Some(v),
                PbfTag::Value(33, v) => seq = Some(v),
                PbfTag::Data(34, d) => url = Some(String::from_utf8(d.to_vec()).unwrap()),
                _ => {}
            }
        }
        assert_eq!(ts, Some(86400));
        assert_eq!(seq, Some(12345));
        assert_eq!(
            url.unwrap(),
            "https://planet.osm.org/replication/minute/"
        );

        header.replication_sequence_number = String::from("frog");
        assert!(make_header_block(&header, &WriterOptions::new()).is_err());
    }
}
