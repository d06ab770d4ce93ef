use std::fmt;

/// Anatomical plane used to cut a 2D view out of a [`Volume`](crate::volume::Volume).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Fixed z (slice index), spans x and y.
    Axial,
    /// Fixed y, spans x and z.
    Coronal,
    /// Fixed x, spans y and z.
    Sagittal,
}

/// Phases a single [`VolumeLoader`](crate::volume_loader::VolumeLoader) run walks through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Idle,
    ResolvingSlices,
    ExtractingSpacing,
    Assembling,
    Delivered,
    Failed,
}

impl LoadPhase {
    /// Text shown on the progress indicator while in this phase.
    pub fn status_message(&self) -> &'static str {
        match self {
            LoadPhase::Idle => "Idle",
            LoadPhase::ResolvingSlices => "Resolving slices",
            LoadPhase::ExtractingSpacing => "Reading voxel spacing",
            LoadPhase::Assembling => "Assembling volume",
            LoadPhase::Delivered => "Done",
            LoadPhase::Failed => "Failed",
        }
    }
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_message())
    }
}
