// Stateful delta encoder: update() returns the difference to the previous
// value. Must be reset whenever the surrounding block starts over, since the
// decoder's running sum starts at zero for each block.
pub struct DeltaEncoder {
    last: i64,
}

impl DeltaEncoder {
    pub fn new() -> DeltaEncoder {
        DeltaEncoder { last: 0 }
    }

    pub fn update(&mut self, v: i64) -> i64 {
        let d = v - self.last;
        self.last = v;
        d
    }

    pub fn reset(&mut self) {
        self.last = 0;
    }
}
