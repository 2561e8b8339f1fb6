pub mod document_source;
pub mod pdf_extraction;
pub mod point_id;
