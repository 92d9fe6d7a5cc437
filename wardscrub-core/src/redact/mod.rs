//! Redaction back ends.
//!
//! * `text`: rewrites a text snapshot right-to-left, replacing each span
//!   with its `[<TYPE> REDACTED]` placeholder.
//! * `image`: masks the pixel boxes of OCR tokens that belong to detected
//!   PII values.

pub mod image;
pub mod text;

pub use self::image::{decode_image, load_image, redact_image, save_image, tokens_to_mask, ImageRedaction};
pub use self::text::redact_spans;
