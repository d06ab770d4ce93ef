use crate::{
    decoder::SliceDecoder, slice_set::SliceList, volume::Volume,
    volume_loader::VolumeLoaderError,
};

use ndarray::{Array3, s};
use tracing::debug;

pub struct VolumeAssembler;

impl VolumeAssembler {
    /// Decode every slice of `slices` into one `[x, y, z]` volume.
    ///
    /// The first slice fixes width and height. `on_progress` is called with
    /// `z / depth` before slice `z` is decoded, so it sees `depth` values in
    /// `[0, 1)`.
    ///
    /// # Errors
    ///
    /// Aborts on the first slice that cannot be decoded
    /// ([`VolumeLoaderError::SliceDecodeFailure`]) or whose raster differs
    /// from the first one ([`VolumeLoaderError::DimensionMismatch`]).
    pub fn assemble(
        decoder: &dyn SliceDecoder,
        slices: &SliceList,
        on_progress: impl FnMut(f32),
    ) -> Result<Volume, VolumeLoaderError> {
        Self::assemble_until(decoder, slices, on_progress, || false)
    }

    /// Like [`assemble`](Self::assemble), but checks `should_stop` once per
    /// slice, after reporting progress and before decoding it.
    ///
    /// # Errors
    ///
    /// As [`assemble`](Self::assemble), plus [`VolumeLoaderError::Cancelled`]
    /// once `should_stop` returns true.
    pub fn assemble_until(
        decoder: &dyn SliceDecoder,
        slices: &SliceList,
        mut on_progress: impl FnMut(f32),
        should_stop: impl Fn() -> bool,
    ) -> Result<Volume, VolumeLoaderError> {
        let decode = |index: usize, path: &std::path::Path| {
            decoder
                .decode_plane(path)
                .map_err(|source| VolumeLoaderError::SliceDecodeFailure {
                    index,
                    path: path.to_path_buf(),
                    source,
                })
        };

        let first = decode(0, slices.first())?;
        let (height, width) = first.dim();
        let mut first_plane = Some(first);
        let depth = slices.len();
        debug!(width, height, depth, "allocating volume");

        let mut volume = Array3::<f64>::zeros((width, height, depth));

        for (z, path) in slices.iter().enumerate() {
            on_progress(z as f32 / depth as f32);
            if should_stop() {
                debug!(index = z, depth, "assembly stopped");
                return Err(VolumeLoaderError::Cancelled { index: z });
            }

            let plane = match first_plane.take() {
                Some(plane) => plane,
                None => decode(z, path)?,
            };

            let (rows, columns) = plane.dim();
            if (columns, rows) != (width, height) {
                return Err(VolumeLoaderError::DimensionMismatch {
                    index: z,
                    expected: (width, height),
                    found: (columns, rows),
                });
            }

            // planes are (rows, columns) = (y, x)
            volume.slice_mut(s![.., .., z]).assign(&plane.t());
        }

        Ok(Volume::new(volume))
    }
}
