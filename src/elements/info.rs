#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Info {
    pub version: i64,
    pub timestamp: i64,
    pub changeset: i64,
    pub user_id: i64,
    pub user: String,
    pub visible: bool,
}

impl Info {
    pub fn new() -> Info {
        Info {
            version: 0,
            timestamp: 0,
            changeset: 0,
            user_id: 0,
            user: String::from(""),
            visible: true,
        }
    }
}
