//! # DICOM-stack library
//!
//! This crate assembles a directory of single-frame DICOM slices into one
//! dense 3D volume, together with the voxel spacing needed to interpret it.
//!
//! The slices of a volume are the files of one directory carrying the
//! `.dcm` extension, or every file when none does. Their lexicographic order
//! is their z order. Spacing (Pixel Spacing and Slice Thickness) is read from
//! the first slice only; when it cannot be read the volume is still loaded and
//! its spacing is reported as unknown.
//!
//! Decoding runs on tokio's blocking pool so the calling task stays free to
//! drive a [`ProgressIndicator`], which is shown for the duration of a load
//! and always hidden again afterwards. DICOM files are assumed to have the
//! following attributes:
//!   - Images from the same series, all with the raster size of the first one
//!   - No multiframe (always the first frame is used)
//!
//! # Examples
//!
//! ## Reading a directory into a volume
//!
//! ```no_run
//! # use dicom_stack::{VolumeLoader, Orientation};
//! # async fn run() -> Result<(), dicom_stack::VolumeLoaderError> {
//! let loaded = VolumeLoader::new().load_volume("dicom").await?;
//! let (width, height, depth) = loaded.volume.dim();
//! let middle = loaded.volume.plane(Orientation::Axial, depth / 2);
//! println!("{width}x{height}x{depth}, spacing {:?}", loaded.spacing);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod config;
pub mod decoder;
pub mod enums;
pub mod progress;
pub mod slice_set;
pub mod spacing;
pub mod volume;
pub mod volume_loader;

pub use assembler::VolumeAssembler;
pub use config::LoaderOptions;
pub use decoder::{DecodeError, DicomSliceDecoder, SliceDecoder, SliceHeader};
pub use enums::{LoadPhase, Orientation};
pub use progress::{NoProgress, ProgressIndicator};
pub use slice_set::{SliceList, SliceSetResolver};
pub use spacing::{Spacing, SpacingError, SpacingFactors, extract_spacing};
pub use volume::Volume;
pub use volume_loader::{LoadedVolume, VolumeLoader, VolumeLoaderError, VolumeSink};
