pub mod http_ocr;

pub use http_ocr::{process_ocr_boxes, HttpOcrClient, TextBox};
