use crate::error::{Error, Result};

use chrono::NaiveDateTime;
use std::fmt;

fn as_secs(dur: std::time::Duration) -> f64 {
    (dur.as_secs() as f64) * 1.0 + (dur.subsec_nanos() as f64) * 0.000000001
}

pub struct Timer(std::time::SystemTime);

impl Timer {
    pub fn new() -> Timer {
        Timer(std::time::SystemTime::now())
    }

    pub fn since(&self) -> f64 {
        as_secs(self.0.elapsed().unwrap())
    }

    pub fn reset(&mut self) {
        self.0 = std::time::SystemTime::now();
    }
}

pub struct ThreadTimer(cpu_time::ThreadTime);

impl ThreadTimer {
    pub fn new() -> ThreadTimer {
        ThreadTimer(cpu_time::ThreadTime::now())
    }

    pub fn since(&self) -> f64 {
        as_secs(self.0.elapsed())
    }
}

pub struct Timings<T> {
    pub timings: Vec<(String, f64)>,
    pub others: Vec<(String, T)>,
}

impl<T> Timings<T> {
    pub fn new() -> Timings<T> {
        Timings {
            timings: Vec::new(),
            others: Vec::new(),
        }
    }

    pub fn add(&mut self, name: &str, tm: f64) {
        for (a, b) in self.timings.iter_mut() {
            if a == name {
                *b += tm;
                return;
            }
        }
        self.timings.push((String::from(name), tm));
    }

    pub fn add_other(&mut self, name: &str, other: T) {
        self.others.push((String::from(name), other));
    }

    pub fn combine(&mut self, other: Timings<T>) {
        for (a, b) in other.timings {
            self.add(&a, b);
        }
        self.others.extend(other.others);
    }
}

impl<T> fmt::Display for Timings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (a, b) in &self.timings {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:0.1}s", a, b)?;
            first = false;
        }
        Ok(())
    }
}

const TIMEFORMAT_UTC: &str = "%Y-%m-%dT%H:%M:%SZ";
const TIMEFORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn parse_timestamp(ts: &str) -> Result<i64> {
    match NaiveDateTime::parse_from_str(ts, TIMEFORMAT_UTC) {
        Ok(tm) => {
            return Ok(tm.timestamp());
        }
        Err(_) => {}
    }

    match NaiveDateTime::parse_from_str(ts, TIMEFORMAT) {
        Ok(tm) => {
            return Ok(tm.timestamp());
        }
        Err(_) => {}
    }

    Err(Error::Encoding(format!(
        "timestamp {}: use \"{}\" or \"{}\"",
        ts, TIMEFORMAT_UTC, TIMEFORMAT
    )))
}

#[cfg(test)]
mod tests {
    use super::parse_timestamp;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1970-01-01T00:00:00Z").unwrap(), 0);
        assert_eq!(parse_timestamp("2020-06-01T12:30:00Z").unwrap(), 1591014600);
        assert_eq!(
            parse_timestamp("2020-06-01T12:30:00").unwrap(),
            parse_timestamp("2020-06-01T12:30:00Z").unwrap()
        );
        assert!(parse_timestamp("20200601").is_err());
    }
}
