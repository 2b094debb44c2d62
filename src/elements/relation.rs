use crate::elements::info::Info;
use crate::elements::tags::Tag;

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

impl ElementType {
    pub fn as_int(&self) -> u64 {
        match self {
            ElementType::Node => 0,
            ElementType::Way => 1,
            ElementType::Relation => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Member {
    pub role: String,
    pub mem_type: ElementType,
    pub mem_ref: i64,
}

impl Member {
    pub fn new(role: &str, mem_type: ElementType, mem_ref: i64) -> Member {
        Member {
            role: String::from(role),
            mem_type: mem_type,
            mem_ref: mem_ref,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Relation {
    pub id: i64,
    pub info: Option<Info>,
    pub tags: Vec<Tag>,
    pub members: Vec<Member>,
}

impl Relation {
    pub fn new(id: i64) -> Relation {
        Relation {
            id: id,
            info: None,
            tags: Vec::new(),
            members: Vec::new(),
        }
    }
}
