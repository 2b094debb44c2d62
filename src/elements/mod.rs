mod bbox;
mod info;
mod node;
mod relation;
mod tags;
mod way;

pub use bbox::Bbox;
pub use info::Info;
pub use node::Node;
pub use relation::{ElementType, Member, Relation};
pub use tags::Tag;
pub use way::{NodeRef, Way};

#[derive(Debug, Clone)]
pub enum Element {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

impl Element {
    pub fn get_id(&self) -> i64 {
        match self {
            Element::Node(n) => n.id,
            Element::Way(w) => w.id,
            Element::Relation(r) => r.id,
        }
    }

    pub fn get_type(&self) -> ElementType {
        match self {
            Element::Node(_) => ElementType::Node,
            Element::Way(_) => ElementType::Way,
            Element::Relation(_) => ElementType::Relation,
        }
    }
}
