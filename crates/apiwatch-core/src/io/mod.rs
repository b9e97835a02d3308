mod reader;
mod writer;

pub use reader::LogReader;
pub use writer::LogWriter;
