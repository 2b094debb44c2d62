// Bounding box in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct Bbox {
    pub minlon: f64,
    pub minlat: f64,
    pub maxlon: f64,
    pub maxlat: f64,
}

impl Bbox {
    pub fn new(minlon: f64, minlat: f64, maxlon: f64, maxlat: f64) -> Bbox {
        Bbox {
            minlon,
            minlat,
            maxlon,
            maxlat,
        }
    }

    pub fn planet() -> Bbox {
        Bbox::new(-180.0, -90.0, 180.0, 90.0)
    }

    pub fn expand(&mut self, other: &Bbox) {
        if other.minlon < self.minlon {
            self.minlon = other.minlon;
        }
        if other.minlat < self.minlat {
            self.minlat = other.minlat;
        }
        if other.maxlon > self.maxlon {
            self.maxlon = other.maxlon;
        }
        if other.maxlat > self.maxlat {
            self.maxlat = other.maxlat;
        }
    }
}
