//! Buffer/image transfer
//!
//! [`RasterBufferTransfer`] moves pixel data between image files and
//! per-band typed buffers. It talks to image files only through the codec
//! collaborator: open or create a handle, move rows one band at a time, close.

use std::marker::PhantomData;
use std::path::Path;

use log::{debug, info, warn};

use crate::buffer::{decode_elements, encode_elements, BandBuffers, Dimensions, Element};
use crate::codec::{self, codec_arena, CodecType, CreateSpec, RasterHandle};
use crate::config::TransferConfig;
use crate::errors::{RasterError, RasterResult};

/// Band buffers read from an image together with its dimensions
#[derive(Debug)]
pub struct Raster<T: Element> {
    pub buffers: BandBuffers<T>,
    pub dimensions: Dimensions,
}

impl<T: Element> Raster<T> {
    pub fn into_parts(self) -> (BandBuffers<T>, Dimensions) {
        (self.buffers, self.dimensions)
    }
}

/// Converts between image files and band buffers of element type `T`
#[derive(Debug, Clone)]
pub struct RasterBufferTransfer<T: Element> {
    config: TransferConfig,
    _element: PhantomData<T>,
}

impl<T: Element> Default for RasterBufferTransfer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> RasterBufferTransfer<T> {
    /// Creates a transfer with the default configuration
    pub fn new() -> Self {
        Self::with_config(TransferConfig::default())
    }

    pub fn with_config(config: TransferConfig) -> Self {
        RasterBufferTransfer { config, _element: PhantomData }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Codec type that `T` is transferred as
    ///
    /// Element types without a codec equivalent map to [`CodecType::Unknown`].
    pub fn map_element_type(&self) -> CodecType {
        T::ELEMENT_TYPE.codec_type()
    }

    /// Fails for element types that map to [`CodecType::Unknown`]
    fn supported_codec_type(&self) -> RasterResult<CodecType> {
        match self.map_element_type() {
            CodecType::Unknown => Err(RasterError::UnsupportedElementType(T::ELEMENT_TYPE)),
            codec_type => Ok(codec_type),
        }
    }

    /// Reads every band of an image into freshly allocated buffers
    ///
    /// # Arguments
    /// * `path` - Image to read
    /// * `init_library` - Run the codec's one-time initialization first
    ///
    /// # Returns
    /// One buffer per band, allocated from the codec arena, and the image
    /// dimensions. On failure nothing is returned and every buffer allocated
    /// so far is released.
    pub fn read_image(&self, path: &Path, init_library: bool) -> RasterResult<Raster<T>> {
        let codec_type = self.supported_codec_type()?;

        if init_library {
            codec::global_init();
        }

        let mut handle = codec::open_for_read(path)
            .map_err(|e| RasterError::open_failed(path, e))?;

        let dimensions = Dimensions::new(handle.width(), handle.height(), handle.band_count());
        info!("Reading {} ({}) as {}", path.display(), dimensions, T::ELEMENT_TYPE);

        let result = dimensions.validate()
            .and_then(|_| self.read_bands(handle.as_mut(), &dimensions, codec_type));
        let closed = handle.close();

        let buffers = result?;
        closed?;
        Ok(Raster { buffers, dimensions })
    }

    fn read_bands(
        &self,
        handle: &mut dyn RasterHandle,
        dimensions: &Dimensions,
        codec_type: CodecType
    ) -> RasterResult<BandBuffers<T>> {
        let width = dimensions.width;
        let height = dimensions.height;
        let block_rows = self.config.rows_per_block.clamp(1, height);
        let row_bytes = width * T::SIZE;

        // One scratch buffer serves every band and row block
        let scratch_len = block_rows * row_bytes;
        let mut scratch = Vec::new();
        scratch.try_reserve_exact(scratch_len).map_err(|_| RasterError::AllocationFailed(scratch_len))?;
        scratch.resize(scratch_len, 0u8);

        let mut buffers = BandBuffers::with_capacity(dimensions.band_count);
        for band in 1..=dimensions.band_count {
            let mut buffer = codec_arena().allocate::<T>(dimensions.pixels_per_band())?;
            debug!("Reading band {} of {}", band, dimensions.band_count);

            let mut row = 0;
            while row < height {
                let rows = block_rows.min(height - row);
                let chunk = &mut scratch[..rows * row_bytes];
                handle.read_rows(band, row, rows, codec_type, chunk)
                    .map_err(|e| RasterError::read_failed(band, row, e))?;
                decode_elements(chunk, &mut buffer[row * width..(row + rows) * width]);
                row += rows;
            }

            buffers.push(buffer);
        }

        Ok(buffers)
    }

    /// Checks that the collection holds one full-size buffer per band
    fn check_buffers(buffers: &BandBuffers<T>, dimensions: &Dimensions) -> RasterResult<()> {
        if buffers.len() != dimensions.band_count {
            return Err(RasterError::BufferMismatch(format!(
                "{} buffers for {} bands", buffers.len(), dimensions.band_count)));
        }

        let expected = dimensions.pixels_per_band();
        for (index, slot) in buffers.slots().iter().enumerate() {
            match slot {
                None => return Err(RasterError::BufferMismatch(format!(
                    "band {} has been released", index + 1))),
                Some(buffer) if buffer.len() != expected => return Err(RasterError::BufferMismatch(format!(
                    "band {} holds {} elements, expected {}", index + 1, buffer.len(), expected))),
                Some(_) => {},
            }
        }
        Ok(())
    }

    /// Writes band buffers to a new image
    ///
    /// # Arguments
    /// * `buffers` - One buffer per band, `width * height` elements each
    /// * `dimensions` - Width, height and band count of the image
    /// * `path` - Image to create; an existing file is replaced
    /// * `driver_name` - Format driver, the configured default when `None`
    /// * `init_library` - Run the codec's one-time initialization first
    ///
    /// Nothing is created when the element type, dimensions or buffers are
    /// rejected. A failed row write stops the transfer; the handle is still
    /// closed and the row error is returned.
    pub fn write_image(
        &self,
        buffers: &BandBuffers<T>,
        dimensions: &Dimensions,
        path: &Path,
        driver_name: Option<&str>,
        init_library: bool
    ) -> RasterResult<()> {
        let codec_type = self.supported_codec_type()?;
        dimensions.validate()?;
        Self::check_buffers(buffers, dimensions)?;

        if init_library {
            codec::global_init();
        }

        let driver_name = driver_name.unwrap_or(&self.config.default_driver);
        let spec = CreateSpec {
            width: dimensions.width,
            height: dimensions.height,
            band_count: dimensions.band_count,
            data_type: codec_type,
        };

        let mut handle = codec::create_for_write(path, &spec, driver_name, &self.config.creation_options)
            .map_err(|e| RasterError::create_failed(path, e))?;
        info!("Writing {} ({}) as {} through {}", path.display(), dimensions, T::ELEMENT_TYPE, driver_name);

        let result = self.write_bands(handle.as_mut(), buffers, dimensions, codec_type);
        let closed = handle.close();

        if let Err(e) = result {
            if let Err(close_error) = closed {
                warn!("Closing {} after a failed write also failed: {}", path.display(), close_error);
            }
            return Err(e);
        }
        closed
    }

    fn write_bands(
        &self,
        handle: &mut dyn RasterHandle,
        buffers: &BandBuffers<T>,
        dimensions: &Dimensions,
        codec_type: CodecType
    ) -> RasterResult<()> {
        let width = dimensions.width;
        let height = dimensions.height;
        let block_rows = self.config.rows_per_block.clamp(1, height);
        let row_bytes = width * T::SIZE;

        // Encoded rows in the little-endian transfer layout
        let encoded_len = block_rows * row_bytes;
        let mut encoded = Vec::new();
        encoded.try_reserve_exact(encoded_len).map_err(|_| RasterError::AllocationFailed(encoded_len))?;
        encoded.resize(encoded_len, 0u8);

        for (index, slot) in buffers.slots().iter().enumerate() {
            let band = index + 1;
            let buffer = slot.as_ref()
                .ok_or_else(|| RasterError::BufferMismatch(format!("band {} has been released", band)))?;
            debug!("Writing band {} of {}", band, dimensions.band_count);

            let mut row = 0;
            while row < height {
                let rows = block_rows.min(height - row);
                let chunk = &mut encoded[..rows * row_bytes];
                encode_elements(&buffer[row * width..(row + rows) * width], chunk);
                handle.write_rows(band, row, rows, codec_type, chunk)
                    .map_err(|e| RasterError::write_failed(band, row, e))?;
                row += rows;
            }
        }

        Ok(())
    }

    /// Releases every buffer in `buffers` through the arena that produced it
    ///
    /// Safe to call repeatedly; returns how many buffers this call released.
    pub fn cleanup(&self, buffers: &mut BandBuffers<T>) -> usize {
        buffers.cleanup()
    }
}

/// Reads an image with the default configuration
pub fn read_image<T: Element>(path: &Path, init_library: bool) -> RasterResult<Raster<T>> {
    RasterBufferTransfer::<T>::new().read_image(path, init_library)
}

/// Writes an image with the default configuration
pub fn write_image<T: Element>(
    buffers: &BandBuffers<T>,
    dimensions: &Dimensions,
    path: &Path,
    driver_name: Option<&str>,
    init_library: bool
) -> RasterResult<()> {
    RasterBufferTransfer::<T>::new().write_image(buffers, dimensions, path, driver_name, init_library)
}

/// Releases a buffer collection; see [`RasterBufferTransfer::cleanup`]
pub fn cleanup<T: Element>(buffers: &mut BandBuffers<T>) -> usize {
    buffers.cleanup()
}
