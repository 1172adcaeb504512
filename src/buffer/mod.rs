//! In-memory side of the transfer
//!
//! Element types, the dimensions triple and arena-tagged band buffers.

mod band_buffer;
mod dimensions;
mod element;

pub use band_buffer::{BandBuffer, BandBuffers};
pub use dimensions::Dimensions;
pub use element::{codec_type_of, decode_elements, encode_elements, map_element_type, Element, ElementType};
