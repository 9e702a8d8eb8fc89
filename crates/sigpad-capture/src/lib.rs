pub mod export;
pub mod surface;
pub mod trim;

pub use export::{CapturedSignature, encode_png_data_url};
pub use surface::{CaptureSurface, PointerKind, PointerSample, StrokeEvent};
pub use trim::{PixelRect, TrimmedImage, ink_bounds, trim};
