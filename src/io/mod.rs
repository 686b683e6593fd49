//! Loading and saving PDF documents.

mod reader;
mod writer;

pub use reader::PdfReader;
pub use writer::PdfWriter;
