//! Text-backed slice fixtures.
//!
//! A fixture slice is a small `key=value` file:
//!
//! ```text
//! spacing=0.5\0.5
//! thickness=2
//! size=4x3
//! fill=7
//! ```
//!
//! `size` is `columns x rows`. A slice without `size` fails to decode.

#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use async_trait::async_trait;
use dicom_stack::{DecodeError, ProgressIndicator, SliceDecoder, SliceHeader};
use ndarray::Array2;

#[derive(Clone, Copy, Debug, Default)]
pub struct TextSliceDecoder;

fn fields(path: &Path) -> Result<Vec<(String, String)>, DecodeError> {
    let text = fs::read_to_string(path).map_err(|e| DecodeError::Open(Box::new(e)))?;
    Ok(text
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect())
}

fn field<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

impl SliceDecoder for TextSliceDecoder {
    fn read_header(&self, path: &Path) -> Result<SliceHeader, DecodeError> {
        let fields = fields(path)?;
        Ok(SliceHeader {
            pixel_spacing: field(&fields, "spacing").map(str::to_string),
            slice_thickness: field(&fields, "thickness").map(str::to_string),
        })
    }

    fn decode_plane(&self, path: &Path) -> Result<Array2<f64>, DecodeError> {
        let fields = fields(path)?;
        let (columns, rows) = field(&fields, "size")
            .and_then(|s| s.split_once('x'))
            .and_then(|(c, r)| Some((c.parse::<usize>().ok()?, r.parse::<usize>().ok()?)))
            .ok_or_else(|| DecodeError::PixelData("no raster".into()))?;
        let fill: f64 = field(&fields, "fill")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);
        Ok(Array2::from_elem((rows, columns), fill))
    }
}

/// [`TextSliceDecoder`] that sleeps before every plane and counts the planes it decoded.
#[derive(Clone, Debug, Default)]
pub struct PacedDecoder {
    pause: Duration,
    decoded: Arc<AtomicUsize>,
}

impl PacedDecoder {
    pub fn new(pause: Duration) -> Self {
        Self {
            pause,
            decoded: Arc::default(),
        }
    }

    pub fn decoded(&self) -> usize {
        self.decoded.load(Ordering::SeqCst)
    }
}

impl SliceDecoder for PacedDecoder {
    fn read_header(&self, path: &Path) -> Result<SliceHeader, DecodeError> {
        TextSliceDecoder.read_header(path)
    }

    fn decode_plane(&self, path: &Path) -> Result<Array2<f64>, DecodeError> {
        thread::sleep(self.pause);
        self.decoded.fetch_add(1, Ordering::SeqCst);
        TextSliceDecoder.decode_plane(path)
    }
}

pub struct SliceSpec<'a> {
    pub name: &'a str,
    pub spacing: Option<&'a str>,
    pub thickness: Option<&'a str>,
    pub size: Option<(usize, usize)>,
    pub fill: f64,
}

impl<'a> SliceSpec<'a> {
    /// 4x4 slice with valid spacing, filled with `fill`.
    pub fn new(name: &'a str, fill: f64) -> Self {
        Self {
            name,
            spacing: Some("0.5\\0.75"),
            thickness: Some("2.5"),
            size: Some((4, 4)),
            fill,
        }
    }
}

pub fn write_slice(dir: &Path, spec: &SliceSpec<'_>) -> PathBuf {
    let mut text = String::new();
    if let Some(spacing) = spec.spacing {
        text.push_str(&format!("spacing={spacing}\n"));
    }
    if let Some(thickness) = spec.thickness {
        text.push_str(&format!("thickness={thickness}\n"));
    }
    if let Some((columns, rows)) = spec.size {
        text.push_str(&format!("size={columns}x{rows}\n"));
    }
    text.push_str(&format!("fill={}\n", spec.fill));

    let path = dir.join(spec.name);
    fs::write(&path, text).unwrap();
    path
}

/// `count` 4x4 slices named `slice_NN.dcm`, slice z filled with z.
pub fn write_stack(dir: &Path, count: usize) {
    for z in 0..count {
        let name = format!("slice_{z:02}.dcm");
        write_slice(dir, &SliceSpec::new(&name, z as f64));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum IndicatorEvent {
    Shown,
    Hidden,
    Message(String),
    Progress(f32),
}

#[derive(Default)]
pub struct RecordingIndicator {
    events: Mutex<Vec<IndicatorEvent>>,
}

impl RecordingIndicator {
    pub fn events(&self) -> Vec<IndicatorEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<f32> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                IndicatorEvent::Progress(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: IndicatorEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ProgressIndicator for RecordingIndicator {
    async fn show(&self) {
        self.push(IndicatorEvent::Shown);
    }

    async fn hide(&self) {
        self.push(IndicatorEvent::Hidden);
    }

    fn set_message(&self, message: &str) {
        self.push(IndicatorEvent::Message(message.to_string()));
    }

    fn set_progress(&self, fraction: f32) {
        self.push(IndicatorEvent::Progress(fraction));
    }
}
