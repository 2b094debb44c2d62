use crate::elements::info::Info;
use crate::elements::tags::Tag;

#[derive(Debug, Clone)]
pub struct NodeRef {
    pub id: i64,
    // (lon, lat) in degrees; None when the location is not known
    pub location: Option<(f64, f64)>,
}

impl NodeRef {
    pub fn new(id: i64) -> NodeRef {
        NodeRef { id: id, location: None }
    }

    pub fn with_location(id: i64, lon: f64, lat: f64) -> NodeRef {
        NodeRef {
            id: id,
            location: Some((lon, lat)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Way {
    pub id: i64,
    pub info: Option<Info>,
    pub tags: Vec<Tag>,
    pub refs: Vec<NodeRef>,
}

impl Way {
    pub fn new(id: i64) -> Way {
        Way {
            id: id,
            info: None,
            tags: Vec::new(),
            refs: Vec::new(),
        }
    }
}
