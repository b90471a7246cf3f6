mod ocr;

pub use ocr::{GoogleVisionRecognizer, TextRecognizer};
