//! Codec collaborator
//!
//! The narrow interface the transfer core consumes: a process-wide driver
//! registry with one-time initialization, open-for-read and create-for-write,
//! per-band row transfer through [`RasterHandle`], allocation arenas, and
//! sample conversion between codec types.

pub mod arena;
mod convert;
mod data_type;
mod driver;
mod options;
pub mod registry;

pub use arena::{caller_arena, codec_arena, Arena};
pub use convert::convert_samples;
pub use data_type::CodecType;
pub use driver::{check_window, CreateSpec, RasterDriver, RasterHandle};
pub use options::CreationOptions;
pub use registry::{create_for_write, global_init, open_for_read, register_driver, DriverRegistry};
