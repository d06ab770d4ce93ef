use crate::enums::Orientation;

use ndarray::{Array3, ArrayView2, s};

/// Dense scalar volume indexed `[x, y, z]`, z being the slice index.
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    data: Array3<f64>,
}

impl Volume {
    pub fn new(data: Array3<f64>) -> Self {
        Self { data }
    }

    /// Get the dimensions of the volume (width, height, depth)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn width(&self) -> usize {
        self.data.dim().0
    }

    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    pub fn depth(&self) -> usize {
        self.data.dim().2
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f64> {
        self.data.get([x, y, z]).copied()
    }

    /// View of one plane through the volume, `None` if `index` is out of range.
    ///
    /// Axial views are `(width, height)`, coronal `(width, depth)` and
    /// sagittal `(height, depth)`.
    pub fn plane(&self, orientation: Orientation, index: usize) -> Option<ArrayView2<'_, f64>> {
        if !self.is_valid_index(index, orientation) {
            return None;
        }
        let view = match orientation {
            Orientation::Axial => self.data.slice(s![.., .., index]),
            Orientation::Coronal => self.data.slice(s![.., index, ..]),
            Orientation::Sagittal => self.data.slice(s![index, .., ..]),
        };
        Some(view)
    }

    /// Smallest and largest intensity, `None` for an empty volume.
    pub fn intensity_range(&self) -> Option<(f64, f64)> {
        self.data.iter().fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    fn is_valid_index(&self, index: usize, orientation: Orientation) -> bool {
        let (width, height, depth) = self.data.dim();
        let max_index = match orientation {
            Orientation::Axial => depth,
            Orientation::Coronal => height,
            Orientation::Sagittal => width,
        };
        index < max_index
    }
}
