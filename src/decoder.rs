use dicom::{
    object::{OpenFileOptions, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, Array4, s};
use std::path::Path;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not open slice: {0}")]
    Open(#[source] BoxError),

    #[error("could not decode pixel data: {0}")]
    PixelData(#[source] BoxError),

    #[error("unexpected pixel array shape {0:?}")]
    UnexpectedShape(Vec<usize>),
}

/// Raw header values needed for voxel spacing, as stored in the file.
///
/// Values are kept as text so that parsing (and its failures) happens in one
/// place regardless of the decoder backend. Multi-valued fields use `\` as the
/// separator, as DICOM does.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SliceHeader {
    pub pixel_spacing: Option<String>,
    pub slice_thickness: Option<String>,
}

/// Codec boundary: everything the loader needs from a slice file.
pub trait SliceDecoder: Send + Sync {
    /// Read the header of `path` without decoding its pixel payload.
    fn read_header(&self, path: &Path) -> Result<SliceHeader, DecodeError>;

    /// Decode the first raster plane of `path` as a `(rows, columns)` array.
    fn decode_plane(&self, path: &Path) -> Result<Array2<f64>, DecodeError>;
}

/// [`SliceDecoder`] backed by dicom-rs.
#[derive(Clone, Copy, Debug, Default)]
pub struct DicomSliceDecoder;

impl SliceDecoder for DicomSliceDecoder {
    fn read_header(&self, path: &Path) -> Result<SliceHeader, DecodeError> {
        let dicom_object = OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)
            .map_err(|e| DecodeError::Open(Box::new(e)))?;

        let text_of = |tag| {
            dicom_object
                .element(tag)
                .ok()
                .and_then(|element| element.to_str().ok())
                .map(|value| value.trim().to_string())
        };

        Ok(SliceHeader {
            pixel_spacing: text_of(tags::PIXEL_SPACING),
            slice_thickness: text_of(tags::SLICE_THICKNESS),
        })
    }

    fn decode_plane(&self, path: &Path) -> Result<Array2<f64>, DecodeError> {
        let dicom_object = open_file(path).map_err(|e| DecodeError::Open(Box::new(e)))?;
        let pixel_data = dicom_object
            .decode_pixel_data()
            .map_err(|e| DecodeError::PixelData(Box::new(e)))?;

        // Neither rescale nor windowing: voxels keep the stored pixel values.
        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::None)
            .with_voi_lut(VoiLutOption::Identity);
        let pixels = pixel_data
            .to_ndarray_with_options::<f64>(&options)
            .map_err(|e| DecodeError::PixelData(Box::new(e)))?;

        first_plane(pixels)
    }
}

/// First sample of the first frame of a `(frames, rows, columns, samples)` array.
fn first_plane(pixels: Array4<f64>) -> Result<Array2<f64>, DecodeError> {
    let (frames, _, _, samples) = pixels.dim();
    if frames == 0 || samples == 0 {
        return Err(DecodeError::UnexpectedShape(pixels.shape().to_vec()));
    }
    Ok(pixels.slice_move(s![0, .., .., 0]))
}
