pub mod callback;
pub mod elements;
pub mod error;
pub mod logging;
pub mod pbfformat;
pub mod utils;

pub use error::{Error, Result};
pub use pbfformat::{Header, PbfWriter, WriterOptions};
