//! Document collaborators around the TOC core: page text in, outline out.

mod outline;
mod text;

pub use outline::LopdfOutline;
pub use text::{extract_pages, pdftotext_version};
