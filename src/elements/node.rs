use crate::elements::info::Info;
use crate::elements::tags::Tag;

#[derive(Debug, Clone)]
pub struct Node {
    pub id: i64,
    pub info: Option<Info>,
    pub tags: Vec<Tag>,

    pub lon: f64,
    pub lat: f64,
}

impl Node {
    pub fn new(id: i64) -> Node {
        Node {
            id: id,
            info: None,
            tags: Vec::new(),
            lon: 0.0,
            lat: 0.0,
        }
    }

    pub fn with_location(id: i64, lon: f64, lat: f64) -> Node {
        Node {
            id: id,
            info: None,
            tags: Vec::new(),
            lon: lon,
            lat: lat,
        }
    }
}
