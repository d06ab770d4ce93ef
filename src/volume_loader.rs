use crate::{
    assembler::VolumeAssembler,
    config::LoaderOptions,
    decoder::{DecodeError, DicomSliceDecoder, SliceDecoder},
    enums::LoadPhase,
    progress::{NoProgress, ProgressIndicator},
    slice_set::{SliceList, SliceSetResolver},
    spacing::{Spacing, extract_spacing},
    volume::Volume,
};

use async_trait::async_trait;
use futures::{StreamExt, channel::mpsc, future};
use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("Slice directory {} not found or unreadable: {source}", .path.display())]
    PathNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No slice files found in {}", .0.display())]
    EmptyDirectory(PathBuf),

    #[error("Could not decode slice {index} ({}): {source}", .path.display())]
    SliceDecodeFailure {
        index: usize,
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error(
        "Slice {index} is {}x{}, expected {}x{} like the first slice",
        .found.0, .found.1, .expected.0, .expected.1
    )]
    DimensionMismatch {
        index: usize,
        /// (width, height) of the first slice
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Background assembly did not finish: {0}")]
    BackgroundTask(String),

    #[error("Assembly stopped before slice {index}")]
    Cancelled { index: usize },

    #[error("Volume sink is closed")]
    SinkClosed,
}

/// Result of one successful load: the volume and its voxel spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedVolume {
    pub volume: Volume,
    pub spacing: Spacing,
}

impl LoadedVolume {
    /// Size of the volume in millimetres along x, y and z, when spacing is known.
    pub fn physical_extent(&self) -> Option<(f32, f32, f32)> {
        let factors = self.spacing.known()?;
        let (width, height, depth) = self.volume.dim();
        Some((
            width as f32 * factors.x,
            height as f32 * factors.y,
            depth as f32 * factors.z,
        ))
    }
}

/// Receiver of finished volumes.
#[async_trait]
pub trait VolumeSink: Send + Sync {
    async fn deliver(&self, loaded: LoadedVolume) -> Result<(), VolumeLoaderError>;
}

#[async_trait]
impl VolumeSink for mpsc::UnboundedSender<LoadedVolume> {
    async fn deliver(&self, loaded: LoadedVolume) -> Result<(), VolumeLoaderError> {
        self.unbounded_send(loaded)
            .map_err(|_| VolumeLoaderError::SinkClosed)
    }
}

/// Loads a directory of slices into a [`LoadedVolume`].
///
/// Slice resolution and spacing extraction run on the calling task; the
/// decode loop runs on tokio's blocking pool while the calling task forwards
/// its progress to the indicator.
pub struct VolumeLoader<P = NoProgress> {
    decoder: Arc<dyn SliceDecoder>,
    indicator: Arc<P>,
    options: LoaderOptions,
}

impl Default for VolumeLoader<NoProgress> {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeLoader<NoProgress> {
    /// Loader reading DICOM files, without a progress indicator.
    pub fn new() -> Self {
        Self {
            decoder: Arc::new(DicomSliceDecoder),
            indicator: Arc::new(NoProgress),
            options: LoaderOptions::default(),
        }
    }
}

impl<P: ProgressIndicator + 'static> VolumeLoader<P> {
    pub fn with_decoder(mut self, decoder: impl SliceDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_indicator<Q: ProgressIndicator + 'static>(self, indicator: Q) -> VolumeLoader<Q> {
        VolumeLoader {
            decoder: self.decoder,
            indicator: Arc::new(indicator),
            options: self.options,
        }
    }

    /// Load the volume stored in `dir`.
    ///
    /// The indicator is shown first and hidden again when the load ends,
    /// whatever the outcome, including when this future is dropped before
    /// completion (the decode loop then stops at its next slice).
    /// Unreadable spacing does not fail the load; it comes back as
    /// [`Spacing::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns error if the directory is missing or empty, or if any slice
    /// cannot be decoded into the volume.
    pub async fn load_volume(
        &self,
        dir: impl AsRef<Path>,
    ) -> Result<LoadedVolume, VolumeLoaderError> {
        self.load_with(dir.as_ref(), |loaded| future::ready(Ok(loaded)))
            .await
    }

    /// Load `dir` and hand the result to `sink` while the indicator is still
    /// shown. Nothing is delivered when the load fails, and a refused
    /// delivery fails the load.
    pub async fn load_into(
        &self,
        dir: impl AsRef<Path>,
        sink: &dyn VolumeSink,
    ) -> Result<(), VolumeLoaderError> {
        self.load_with(dir.as_ref(), |loaded| sink.deliver(loaded))
            .await
    }

    async fn load_with<T, F, Fut>(&self, dir: &Path, deliver: F) -> Result<T, VolumeLoaderError>
    where
        F: FnOnce(LoadedVolume) -> Fut,
        Fut: Future<Output = Result<T, VolumeLoaderError>>,
    {
        let guard = IndicatorGuard::show(&self.indicator).await;

        let result = match self.run(dir).await {
            Ok(loaded) => deliver(loaded).await,
            Err(e) => Err(e),
        };
        match &result {
            Ok(_) => self.enter(LoadPhase::Delivered),
            Err(e) => {
                self.enter(LoadPhase::Failed);
                warn!(dir = %dir.display(), error = %e, "volume load failed");
            }
        }

        guard.release().await;
        result
    }

    async fn run(&self, dir: &Path) -> Result<LoadedVolume, VolumeLoaderError> {
        self.enter(LoadPhase::ResolvingSlices);
        let slices = SliceSetResolver::new(&self.options.extension).resolve(dir)?;
        debug!(slices = slices.len(), first = %slices.first().display(), "resolved slice set");

        self.enter(LoadPhase::ExtractingSpacing);
        let spacing: Spacing = extract_spacing(self.decoder.as_ref(), slices.first())
            .inspect_err(|e| {
                warn!(
                    slice = %slices.first().display(),
                    error = %e,
                    "voxel spacing unknown, continuing without it"
                )
            })
            .into();

        self.enter(LoadPhase::Assembling);
        let volume = self.assemble_in_background(slices).await?;
        info!(
            dir = %dir.display(),
            dim = ?volume.dim(),
            spacing = ?spacing,
            "volume assembled"
        );

        Ok(LoadedVolume { volume, spacing })
    }

    async fn assemble_in_background(&self, slices: SliceList) -> Result<Volume, VolumeLoaderError> {
        let decoder = Arc::clone(&self.decoder);
        let (progress_tx, mut progress_rx) = mpsc::unbounded::<f32>();

        // a closed channel means the load future was dropped
        let worker = tokio::task::spawn_blocking(move || {
            VolumeAssembler::assemble_until(
                decoder.as_ref(),
                &slices,
                |fraction| {
                    let _ = progress_tx.unbounded_send(fraction);
                },
                || progress_tx.is_closed(),
            )
        });

        // ends once the worker drops its sender
        while let Some(fraction) = progress_rx.next().await {
            self.indicator.set_progress(fraction);
        }

        worker
            .await
            .map_err(|e| VolumeLoaderError::BackgroundTask(e.to_string()))?
    }

    fn enter(&self, phase: LoadPhase) {
        debug!(phase = ?phase, "entering load phase");
        match phase {
            LoadPhase::Assembling => self.indicator.set_message(&self.options.loading_message),
            _ => self.indicator.set_message(phase.status_message()),
        }
    }
}

/// Keeps the indicator's visibility scoped to one load. Released normally it
/// hides in place; dropped with its load future it hides from a spawned task.
struct IndicatorGuard<P: ProgressIndicator + 'static> {
    indicator: Option<Arc<P>>,
}

impl<P: ProgressIndicator + 'static> IndicatorGuard<P> {
    async fn show(indicator: &Arc<P>) -> Self {
        let guard = Self {
            indicator: Some(Arc::clone(indicator)),
        };
        indicator.show().await;
        guard
    }

    async fn release(mut self) {
        if let Some(indicator) = self.indicator.take() {
            indicator.hide().await;
        }
    }
}

impl<P: ProgressIndicator + 'static> Drop for IndicatorGuard<P> {
    fn drop(&mut self) {
        let Some(indicator) = self.indicator.take() else {
            return;
        };
        debug!("load abandoned, hiding progress indicator");
        indicator.set_message(LoadPhase::Failed.status_message());
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move { indicator.hide().await });
            }
            Err(_) => warn!("no tokio runtime left to hide the progress indicator"),
        }
    }
}
