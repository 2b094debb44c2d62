use crate::pbfformat::write_pbf;

use std::collections::HashMap;

// Per-block string dictionary. Entry 0 is always the empty string: index 0
// marks "no entry" on the wire (e.g. the tag run terminator in DenseNodes),
// so user strings start at 1. Indices are assigned in insertion order.
pub struct StringTable {
    index: HashMap<String, u32>,
    entries: Vec<String>,
    nbytes: usize,
}

impl StringTable {
    pub fn new() -> StringTable {
        let mut st = StringTable {
            index: HashMap::new(),
            entries: Vec::new(),
            nbytes: 0,
        };
        st.clear();
        st
    }

    pub fn add(&mut self, s: &str) -> u32 {
        match self.index.get(s) {
            Some(i) => *i,
            None => {
                let i = self.entries.len() as u32;
                self.index.insert(String::from(s), i);
                self.entries.push(String::from(s));
                self.nbytes += write_pbf::data_length(1, s.len());
                i
            }
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
        self.index.insert(String::new(), 0);
        self.entries.push(String::new());
        self.nbytes = write_pbf::data_length(1, 0);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // approximate serialized size, used by the block rollover check
    pub fn size(&self) -> usize {
        self.nbytes
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.nbytes);
        for s in &self.entries {
            write_pbf::pack_data(&mut res, 1, s.as_bytes());
        }
        res
    }
}
