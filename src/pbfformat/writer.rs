use crate::callback::{
    CallFinish, Callback, CallbackMerge, CallbackSync, MergeTimings, ReplaceNoneWithTimings,
};
use crate::elements::{Element, Node, Relation, Way};
use crate::error::{Error, Result};
use crate::message;
use crate::pbfformat::{
    make_header_block, serialize_blob, BlobType, CompressionType, GroupType, Header,
    PrimitiveBlock, Timings, WriteFile, WriterOptions,
};
use crate::utils::{ThreadTimer, Timer};

// Compression worker: turns serialized block messages into framed blobs.
// On the first failure it stops doing work and hands the error on at
// finish time, so a broken job poisons the pipeline instead of the output.
struct SerializeBlobs<T> {
    out: Box<T>,
    compression: CompressionType,
    compression_level: u32,
    tm: f64,
    err: Option<Error>,
}

impl<T> SerializeBlobs<T>
where
    T: CallFinish<CallType = Vec<u8>, ReturnType = Timings>,
{
    fn new(out: Box<T>, compression: CompressionType, compression_level: u32) -> SerializeBlobs<T> {
        SerializeBlobs {
            out: out,
            compression: compression,
            compression_level: compression_level,
            tm: 0.0,
            err: None,
        }
    }
}

impl<T> CallFinish for SerializeBlobs<T>
where
    T: CallFinish<CallType = Vec<u8>, ReturnType = Timings>,
{
    type CallType = (BlobType, Vec<u8>);
    type ReturnType = Timings;

    fn call(&mut self, (blob_type, data): (BlobType, Vec<u8>)) {
        if self.err.is_some() {
            return;
        }
        let c = ThreadTimer::new();
        match serialize_blob(&data, blob_type, self.compression, self.compression_level) {
            Ok(packed) => {
                self.tm += c.since();
                self.out.call(packed);
            }
            Err(e) => {
                self.err = Some(e);
            }
        }
    }

    fn finish(&mut self) -> Result<Timings> {
        let res = self.out.finish();
        if let Some(e) = self.err.take() {
            return Err(e);
        }
        let mut tms = res?;
        tms.add("serialize_blob", self.tm);
        Ok(tms)
    }
}

// Drives the block state machine over a stream of elements and hands full
// blocks to the compression pipeline. Blob order in the file always matches
// the order blocks were flushed here: jobs are distributed round robin and
// the writer end drains them in the same round robin order, so out of order
// completion on the workers is invisible to the sink.
pub struct PbfWriter {
    out: Option<Box<dyn CallFinish<CallType = (BlobType, Vec<u8>), ReturnType = Timings>>>,
    options: WriterOptions,
    block: PrimitiveBlock,
    header_written: bool,
    tm: Timer,
}

impl PbfWriter {
    pub fn new(outfn: &str, options: WriterOptions, numchan: usize) -> Result<PbfWriter> {
        let wf = Box::new(WriteFile::new(outfn)?);

        let out: Box<dyn CallFinish<CallType = (BlobType, Vec<u8>), ReturnType = Timings>> =
            if numchan == 0 {
                Box::new(SerializeBlobs::new(
                    wf,
                    options.compression,
                    options.compression_level,
                ))
            } else {
                let wfs = CallbackSync::new(wf, numchan);
                let mut packs: Vec<
                    Box<dyn CallFinish<CallType = (BlobType, Vec<u8>), ReturnType = Timings>>,
                > = Vec::new();
                for w in wfs {
                    let w2 = Box::new(ReplaceNoneWithTimings::new(w));
                    packs.push(Box::new(Callback::new(Box::new(SerializeBlobs::new(
                        w2,
                        options.compression,
                        options.compression_level,
                    )))));
                }
                Box::new(CallbackMerge::new(packs, Box::new(MergeTimings::new())))
            };

        Ok(PbfWriter {
            out: Some(out),
            options: options,
            block: PrimitiveBlock::new(),
            header_written: false,
            tm: Timer::new(),
        })
    }

    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        if self.header_written {
            return Err(Error::Encoding(String::from("header already written")));
        }
        if header.multiple_object_versions {
            self.options.add_historical_information_flag = true;
            self.options.add_visible_flag = true;
        }

        let data = make_header_block(header, &self.options)?;
        self.out.as_mut().unwrap().call((BlobType::Header, data));
        self.header_written = true;
        Ok(())
    }

    fn check_header(&mut self) -> Result<()> {
        if !self.header_written {
            self.write_header(&Header::new())?;
        }
        Ok(())
    }

    pub fn write_element(&mut self, ele: Element) -> Result<()> {
        match ele {
            Element::Node(n) => self.write_node(&n),
            Element::Way(w) => self.write_way(&w),
            Element::Relation(r) => self.write_relation(&r),
        }
    }

    pub fn write_entities(&mut self, eles: impl IntoIterator<Item = Element>) -> Result<()> {
        for e in eles {
            self.write_element(e)?;
        }
        Ok(())
    }

    pub fn write_node(&mut self, node: &Node) -> Result<()> {
        self.check_header()?;
        if self.options.dense_nodes {
            self.switch_group_type(GroupType::Dense)?;
            self.block.add_dense_node(node, &self.options)
        } else {
            self.switch_group_type(GroupType::Nodes)?;
            self.block.add_node(node, &self.options)
        }
    }

    pub fn write_way(&mut self, way: &Way) -> Result<()> {
        self.check_header()?;
        self.switch_group_type(GroupType::Ways)?;
        self.block.add_way(way, &self.options)
    }

    pub fn write_relation(&mut self, rel: &Relation) -> Result<()> {
        self.check_header()?;
        self.switch_group_type(GroupType::Relations)?;
        self.block.add_relation(rel, &self.options)
    }

    fn switch_group_type(&mut self, group_type: GroupType) -> Result<()> {
        if !self.block.can_add(group_type) {
            self.store_primitive_block()?;
            self.block.reset(group_type);
        }
        Ok(())
    }

    fn store_primitive_block(&mut self) -> Result<()> {
        if self.block.count() == 0 {
            return Ok(());
        }

        let data = self.block.serialize(&self.options);
        self.out.as_mut().unwrap().call((BlobType::Data, data));
        Ok(())
    }

    pub fn finish(mut self) -> Result<Timings> {
        self.check_header()?;
        self.store_primitive_block()?;

        let mut out = self.out.take().unwrap();
        let mut tms = out.finish()?;
        tms.add("total", self.tm.since());
        message!("finished pbf write: {}", tms);
        Ok(tms)
    }
}
