use crate::callback::CallFinish;
use crate::error::{Error, Result};
use crate::message;
use crate::pbfformat::Timings;
use crate::utils::ThreadTimer;

use std::fs::File;
use std::io::Write;

// Blocking byte sink at the end of the pipeline. Blobs arrive as ready
// framed byte sequences, already in file order; the first write error is
// kept and reported from finish().
pub struct WriteFile {
    outf: Option<File>,
    fname: String,
    tm: f64,
    nbytes: u64,
    nblobs: usize,
    err: Option<Error>,
}

impl WriteFile {
    pub fn new(outfn: &str) -> Result<WriteFile> {
        let outf = File::create(outfn)?;
        Ok(WriteFile {
            outf: Some(outf),
            fname: String::from(outfn),
            tm: 0.0,
            nbytes: 0,
            nblobs: 0,
            err: None,
        })
    }
}

impl CallFinish for WriteFile {
    type CallType = Vec<u8>;
    type ReturnType = Timings;

    fn call(&mut self, d: Vec<u8>) {
        if self.err.is_some() {
            return;
        }
        let c = ThreadTimer::new();
        match self.outf.as_mut().unwrap().write_all(&d) {
            Ok(()) => {
                self.nbytes += d.len() as u64;
                self.nblobs += 1;
            }
            Err(e) => {
                self.err = Some(Error::Io(e));
            }
        }
        self.tm += c.since();
    }

    fn finish(&mut self) -> Result<Timings> {
        drop(self.outf.take());

        if let Some(e) = self.err.take() {
            return Err(e);
        }

        message!(
            "{}: wrote {} blobs, {} bytes",
            self.fname,
            self.nblobs,
            self.nbytes
        );

        let mut tms = Timings::new();
        tms.add("write", self.tm);
        Ok(tms)
    }
}
