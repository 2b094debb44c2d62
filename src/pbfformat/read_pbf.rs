// Minimal tag reader, only used to check written output in tests.

#[derive(PartialEq, Debug)]
pub enum PbfTag<'a> {
    Value(u64, u64),
    Data(u64, &'a [u8]),
    Null,
}

pub fn read_uint32(data: &[u8], pos: usize) -> (u64, usize) {
    assert!(pos + 4 <= data.len());
    let mut res: u64 = 0;

    res |= data[pos + 3] as u64;
    res |= (data[pos + 2] as u64) << 8;
    res |= (data[pos + 1] as u64) << 16;
    res |= (data[pos] as u64) << 24;

    (res, pos + 4)
}

pub fn un_zig_zag(uv: u64) -> i64 {
    let x = (uv >> 1) as i64;
    if (uv & 1) != 0 {
        return x ^ -1;
    }
    x
}

pub fn read_uint(data: &[u8], pos: usize) -> (u64, usize) {
    let mut res: u64 = 0;
    let mut i = 0;
    loop {
        if i >= 10 {
            break;
        }
        let x = data[pos + i];
        let y = (x & 127) as u64;
        res |= y << (7 * i);

        if (x & 128) == 0 {
            return (res, pos + i + 1);
        }
        i += 1;
    }
    (res, pos + 10)
}

fn read_data<'a>(data: &'a [u8], pos: usize) -> (&'a [u8], usize) {
    let (ln, pos) = read_uint(data, pos);

    let l = ln as usize;
    (&data[pos..pos + l], pos + l)
}

fn read_tag<'a>(data: &'a [u8], pos: usize) -> (PbfTag<'a>, usize) {
    let (t, pos) = read_uint(data, pos);

    if t == 0 {
        return (PbfTag::Null, pos);
    }

    if (t & 7) == 0 {
        let (v, pos) = read_uint(data, pos);
        return (PbfTag::Value(t >> 3, v), pos);
    }
    if (t & 7) == 2 {
        let (s, pos) = read_data(data, pos);
        return (PbfTag::Data(t >> 3, s), pos);
    }
    (PbfTag::Null, pos)
}

pub struct IterTags<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> IterTags<'a> {
    pub fn new(data: &'a [u8]) -> IterTags<'a> {
        IterTags { data, pos: 0 }
    }
}

impl<'a> Iterator for IterTags<'a> {
    type Item = PbfTag<'a>;

    fn next(&mut self) -> Option<PbfTag<'a>> {
        if self.pos < self.data.len() {
            let (t, npos) = read_tag(self.data, self.pos);
            self.pos = npos;
            return Some(t);
        }
        None
    }
}

pub fn read_packed_int(data: &[u8]) -> Vec<u64> {
    let mut res = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let (v, npos) = read_uint(data, pos);
        res.push(v);
        pos = npos;
    }
    res
}

pub fn read_delta_packed_int(data: &[u8]) -> Vec<i64> {
    let mut res = Vec::new();
    let mut curr = 0;
    for v in read_packed_int(data) {
        curr += un_zig_zag(v);
        res.push(curr);
    }
    res
}

// Splits a finished file back into (block type, uncompressed payload)
// pairs, checking the framing as it goes.
pub fn read_file_blocks(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    let mut res = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let (hlen, npos) = read_uint32(data, pos);
        let head = &data[npos..npos + hlen as usize];

        let mut block_type = String::new();
        let mut datasize = 0;
        for t in IterTags::new(head) {
            match t {
                PbfTag::Data(1, d) => block_type = String::from_utf8(d.to_vec()).unwrap(),
                PbfTag::Value(3, v) => datasize = v as usize,
                _ => panic!("unexpected blob header field {:?}", t),
            }
        }

        let start = npos + hlen as usize;
        let body = &data[start..start + datasize];

        let mut raw = Vec::new();
        let mut raw_size: Option<usize> = None;
        for t in IterTags::new(body) {
            match t {
                PbfTag::Data(1, d) => raw = d.to_vec(),
                PbfTag::Value(2, v) => raw_size = Some(v as usize),
                PbfTag::Data(3, d) => {
                    ZlibDecoder::new(d).read_to_end(&mut raw).unwrap();
                }
                #[cfg(feature = "lz4")]
                PbfTag::Data(6, d) => {
                    raw = lz4_flex::block::decompress(d, raw_size.unwrap()).unwrap();
                }
                _ => panic!("unexpected blob field {:?}", t),
            }
        }
        if let Some(rs) = raw_size {
            assert_eq!(rs, raw.len());
        }

        res.push((block_type, raw));
        pos = start + datasize;
    }
    res
}
