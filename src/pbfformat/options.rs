use crate::error::{Error, Result};
use crate::pbfformat::CompressionType;

use std::collections::HashMap;

// Which per-entity metadata columns get serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataOptions {
    pub version: bool,
    pub timestamp: bool,
    pub changeset: bool,
    pub uid: bool,
    pub user: bool,
}

impl MetadataOptions {
    pub fn all() -> MetadataOptions {
        MetadataOptions {
            version: true,
            timestamp: true,
            changeset: true,
            uid: true,
            user: true,
        }
    }

    pub fn none() -> MetadataOptions {
        MetadataOptions {
            version: false,
            timestamp: false,
            changeset: false,
            uid: false,
            user: false,
        }
    }

    // empty and "true" mean everything, otherwise a '+'-separated list of
    // field names
    pub fn from_str(s: &str) -> Result<MetadataOptions> {
        match s {
            "" | "all" | "true" => {
                return Ok(MetadataOptions::all());
            }
            "none" | "false" => {
                return Ok(MetadataOptions::none());
            }
            _ => {}
        }

        let mut res = MetadataOptions::none();
        for p in s.split('+') {
            match p {
                "version" => res.version = true,
                "timestamp" => res.timestamp = true,
                "changeset" => res.changeset = true,
                "uid" => res.uid = true,
                "user" => res.user = true,
                _ => {
                    return Err(Error::Config(format!(
                        "unknown metadata field '{}' in 'add_metadata'",
                        p
                    )));
                }
            }
        }
        Ok(res)
    }

    pub fn any(&self) -> bool {
        self.version || self.timestamp || self.changeset || self.uid || self.user
    }
}

#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub add_metadata: MetadataOptions,
    pub compression: CompressionType,
    pub compression_level: u32,
    pub dense_nodes: bool,
    pub add_historical_information_flag: bool,
    pub add_visible_flag: bool,
    pub locations_on_ways: bool,
}

fn get<'a>(opts: &'a HashMap<String, String>, key: &str) -> &'a str {
    match opts.get(key) {
        Some(v) => v,
        None => "",
    }
}

fn is_true(v: &str) -> bool {
    v == "true" || v == "yes"
}

fn is_not_false(v: &str) -> bool {
    !(v == "false" || v == "no")
}

fn get_compression_type(v: &str) -> Result<CompressionType> {
    match v {
        "" | "zlib" | "true" => Ok(CompressionType::Zlib),
        "none" | "false" => Ok(CompressionType::None),
        #[cfg(feature = "lz4")]
        "lz4" => Ok(CompressionType::Lz4),
        #[cfg(not(feature = "lz4"))]
        "lz4" => Err(Error::Config(String::from("lz4 blobs not supported"))),
        _ => Err(Error::Config(format!("unknown compression '{}'", v))),
    }
}

fn default_compression_level(compression: CompressionType) -> u32 {
    match compression {
        CompressionType::None => 0,
        CompressionType::Zlib => flate2::Compression::default().level(),
        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => 1,
    }
}

fn check_compression_level(compression: CompressionType, level: u32) -> Result<()> {
    match compression {
        CompressionType::None => Err(Error::Config(String::from(
            "the 'pbf_compression_level' option doesn't make sense without 'pbf_compression' set",
        ))),
        CompressionType::Zlib => {
            if level > 9 {
                return Err(Error::Config(format!(
                    "zlib compression level must be between 0 and 9, got {}",
                    level
                )));
            }
            Ok(())
        }
        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => {
            if level > 16 {
                return Err(Error::Config(format!(
                    "lz4 compression level must be between 0 and 16, got {}",
                    level
                )));
            }
            Ok(())
        }
    }
}

impl WriterOptions {
    pub fn new() -> WriterOptions {
        WriterOptions {
            add_metadata: MetadataOptions::all(),
            compression: CompressionType::Zlib,
            compression_level: default_compression_level(CompressionType::Zlib),
            dense_nodes: true,
            add_historical_information_flag: false,
            add_visible_flag: false,
            locations_on_ways: false,
        }
    }

    pub fn from_map(
        opts: &HashMap<String, String>,
        multiple_object_versions: bool,
    ) -> Result<WriterOptions> {
        for k in opts.keys() {
            match k.as_str() {
                "pbf_dense_nodes" | "pbf_compression" | "pbf_compression_level"
                | "add_metadata" | "locations_on_ways" => {}
                "pbf_add_metadata" => {
                    return Err(Error::Config(String::from(
                        "the 'pbf_add_metadata' option is deprecated, use 'add_metadata' instead",
                    )));
                }
                _ => {
                    return Err(Error::Config(format!("unknown option '{}'", k)));
                }
            }
        }

        let mut res = WriterOptions::new();
        res.dense_nodes = is_not_false(get(opts, "pbf_dense_nodes"));
        res.compression = get_compression_type(get(opts, "pbf_compression"))?;
        res.add_metadata = MetadataOptions::from_str(get(opts, "add_metadata"))?;
        res.add_historical_information_flag = multiple_object_versions;
        res.add_visible_flag = multiple_object_versions;
        res.locations_on_ways = is_true(get(opts, "locations_on_ways"));

        let pbl = get(opts, "pbf_compression_level");
        if pbl.is_empty() {
            res.compression_level = default_compression_level(res.compression);
        } else {
            let val: u32 = match pbl.parse() {
                Ok(v) => v,
                Err(_) => {
                    return Err(Error::Config(String::from(
                        "the 'pbf_compression_level' option must be an integer",
                    )));
                }
            };
            check_compression_level(res.compression, val)?;
            res.compression_level = val;
        }

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(kvs: &[(&str, &str)]) -> HashMap<String, String> {
        kvs.iter()
            .map(|(k, v)| (String::from(*k), String::from(*v)))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let o = WriterOptions::from_map(&HashMap::new(), false).unwrap();
        assert_eq!(o.compression, CompressionType::Zlib);
        assert_eq!(o.compression_level, 6);
        assert!(o.dense_nodes);
        assert!(o.add_metadata.any());
        assert!(!o.locations_on_ways);
        assert!(!o.add_visible_flag);
    }

    #[test]
    fn test_parse_flags() {
        let o = WriterOptions::from_map(
            &map(&[
                ("pbf_dense_nodes", "false"),
                ("pbf_compression", "none"),
                ("locations_on_ways", "true"),
                ("add_metadata", "version+timestamp"),
            ]),
            true,
        )
        .unwrap();
        assert!(!o.dense_nodes);
        assert_eq!(o.compression, CompressionType::None);
        assert!(o.locations_on_ways);
        assert!(o.add_metadata.version);
        assert!(o.add_metadata.timestamp);
        assert!(!o.add_metadata.user);
        assert!(o.add_historical_information_flag);
        assert!(o.add_visible_flag);
    }

    #[test]
    fn test_compression_level() {
        let o =
            WriterOptions::from_map(&map(&[("pbf_compression_level", "9")]), false).unwrap();
        assert_eq!(o.compression_level, 9);

        assert!(WriterOptions::from_map(&map(&[("pbf_compression_level", "12")]), false).is_err());
        assert!(
            WriterOptions::from_map(&map(&[("pbf_compression_level", "frog")]), false).is_err()
        );
        assert!(WriterOptions::from_map(
            &map(&[("pbf_compression", "none"), ("pbf_compression_level", "6")]),
            false
        )
        .is_err());
    }

    #[test]
    fn test_rejected_options() {
        assert!(WriterOptions::from_map(&map(&[("pbf_add_metadata", "true")]), false).is_err());
        assert!(WriterOptions::from_map(&map(&[("no_such_option", "1")]), false).is_err());
        assert!(WriterOptions::from_map(&map(&[("add_metadata", "frog")]), false).is_err());
        assert!(
            WriterOptions::from_map(&map(&[("pbf_compression", "bzip2")]), false).is_err()
        );
    }

    #[cfg(not(feature = "lz4"))]
    #[test]
    fn test_lz4_unavailable() {
        assert!(WriterOptions::from_map(&map(&[("pbf_compression", "lz4")]), false).is_err());
    }

    #[cfg(feature = "lz4")]
    #[test]
    fn test_lz4_available() {
        let o = WriterOptions::from_map(&map(&[("pbf_compression", "lz4")]), false).unwrap();
        assert_eq!(o.compression, CompressionType::Lz4);
        assert_eq!(o.compression_level, 1);
    }

    #[test]
    fn test_metadata_options() {
        assert_eq!(MetadataOptions::from_str("").unwrap(), MetadataOptions::all());
        assert_eq!(
            MetadataOptions::from_str("none").unwrap(),
            MetadataOptions::none()
        );
        assert!(!MetadataOptions::none().any());
        let o = MetadataOptions::from_str("uid+user").unwrap();
        assert!(o.uid && o.user && !o.version && !o.timestamp && !o.changeset);
    }
}
