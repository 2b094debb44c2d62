use crate::error::{Error, Result};
use crate::pbfformat::write_pbf;
use crate::pbfformat::MAX_BLOB_SIZE_HARD_LIMIT;

use flate2::write::ZlibEncoder;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Zlib,
    #[cfg(feature = "lz4")]
    Lz4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobType {
    Header,
    Data,
}

impl BlobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobType::Header => "OSMHeader",
            BlobType::Data => "OSMData",
        }
    }
}

fn compress_zlib(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut e = ZlibEncoder::new(Vec::new(), flate2::Compression::new(level));
    match e.write_all(data) {
        Ok(()) => {}
        Err(e) => {
            return Err(Error::Compression(format!("zlib: {}", e)));
        }
    }
    match e.finish() {
        Ok(comp) => Ok(comp),
        Err(e) => Err(Error::Compression(format!("zlib: {}", e))),
    }
}

#[cfg(feature = "lz4")]
fn compress_lz4(data: &[u8]) -> Vec<u8> {
    lz4_flex::block::compress(data)
}

/// Compress a serialized block message and frame it as a length-prefixed
/// BlobHeader + Blob pair, ready to append to the file. Pure function, safe
/// to run on any worker thread.
pub fn serialize_blob(
    data: &[u8],
    blob_type: BlobType,
    compression: CompressionType,
    compression_level: u32,
) -> Result<Vec<u8>> {
    if data.len() > MAX_BLOB_SIZE_HARD_LIMIT {
        return Err(Error::Encoding(format!(
            "blob payload of {} bytes exceeds the {} byte limit",
            data.len(),
            MAX_BLOB_SIZE_HARD_LIMIT
        )));
    }

    let mut body = Vec::new();
    match compression {
        CompressionType::None => {
            body.reserve(data.len() + 5);
            write_pbf::pack_data(&mut body, 1, data);
        }
        CompressionType::Zlib => {
            let comp = compress_zlib(data, compression_level)?;
            body.reserve(comp.len() + 15);
            write_pbf::pack_value(&mut body, 2, data.len() as u64);
            write_pbf::pack_data(&mut body, 3, &comp);
        }
        #[cfg(feature = "lz4")]
        CompressionType::Lz4 => {
            let comp = compress_lz4(data);
            body.reserve(comp.len() + 15);
            write_pbf::pack_value(&mut body, 2, data.len() as u64);
            write_pbf::pack_data(&mut body, 6, &comp);
        }
    }

    let mut head = Vec::with_capacity(25);
    write_pbf::pack_data(&mut head, 1, blob_type.as_str().as_bytes());
    write_pbf::pack_value(&mut head, 3, body.len() as u64);

    let mut result = Vec::with_capacity(4 + head.len() + body.len());
    write_pbf::write_uint32(&mut result, head.len() as u32);
    result.extend(head);
    result.extend(body);

    Ok(result)
}
