// src/raster/grid.rs
use geo::{coord, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// NoData value written by every index, composite and statistics step
pub const NODATA: f32 = -999.0;

/// North-up affine transform (lon/lat degrees per pixel)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// West edge of the first column
    pub origin_x: f64,
    /// North edge of the first row
    pub origin_y: f64,
    pub pixel_width: f64,
    /// Positive; rows advance southwards
    pub pixel_height: f64,
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            pixel_width: 1.0,
            pixel_height: 1.0,
        }
    }
}

impl GeoTransform {
    /// Geographic coordinate of a pixel centre
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.pixel_width,
            self.origin_y - (row as f64 + 0.5) * self.pixel_height,
        )
    }
}

/// Pixel window inside a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Shape and georeferencing shared by every band of a scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub transform: GeoTransform,
}

impl GridSpec {
    pub fn new(width: usize, height: usize, transform: GeoTransform) -> Self {
        Self {
            width,
            height,
            transform,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Geographic extent of the whole grid
    pub fn extent(&self) -> Rect<f64> {
        let t = &self.transform;
        Rect::new(
            coord! { x: t.origin_x, y: t.origin_y - self.height as f64 * t.pixel_height },
            coord! { x: t.origin_x + self.width as f64 * t.pixel_width, y: t.origin_y },
        )
    }

    /// Pixel window covering `bounds`, clamped to the grid
    pub fn window(&self, bounds: &Rect<f64>) -> Window {
        let t = &self.transform;
        let to_col = |x: f64| (x - t.origin_x) / t.pixel_width;
        let to_row = |y: f64| (t.origin_y - y) / t.pixel_height;

        let col_start = to_col(bounds.min().x).floor().max(0.0);
        let col_end = to_col(bounds.max().x).ceil().min(self.width as f64);
        let row_start = to_row(bounds.max().y).floor().max(0.0);
        let row_end = to_row(bounds.min().y).ceil().min(self.height as f64);

        if col_end <= col_start || row_end <= row_start {
            return Window {
                col_off: 0,
                row_off: 0,
                width: 0,
                height: 0,
            };
        }

        Window {
            col_off: col_start as usize,
            row_off: row_start as usize,
            width: (col_end - col_start) as usize,
            height: (row_end - row_start) as usize,
        }
    }

    /// Grid describing a window of this grid
    pub fn sub_grid(&self, window: &Window) -> GridSpec {
        let t = &self.transform;
        GridSpec {
            width: window.width,
            height: window.height,
            transform: GeoTransform {
                origin_x: t.origin_x + window.col_off as f64 * t.pixel_width,
                origin_y: t.origin_y - window.row_off as f64 * t.pixel_height,
                ..*t
            },
        }
    }
}

/// Pixel types that can live in a [`Raster`]
pub trait Pixel: Copy + PartialEq + Send + Sync {
    fn is_missing(&self, nodata: Option<Self>) -> bool {
        nodata == Some(*self)
    }
}

impl Pixel for f32 {
    fn is_missing(&self, nodata: Option<Self>) -> bool {
        !self.is_finite() || nodata == Some(*self)
    }
}

impl Pixel for u8 {}
impl Pixel for u16 {}
impl Pixel for bool {}

/// Single-band grid stored in row-major order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raster<T> {
    pub grid: GridSpec,
    pub data: Vec<T>,
    #[serde(default)]
    pub nodata: Option<T>,
}

impl<T: Pixel> Raster<T> {
    pub fn new(grid: GridSpec, data: Vec<T>, nodata: Option<T>) -> Result<Self> {
        if data.len() != grid.len() {
            return Err(EngineError::GridMismatch {
                expected: grid.shape(),
                found: (data.len(), 1),
            });
        }
        Ok(Self { grid, data, nodata })
    }

    pub fn filled(grid: GridSpec, value: T, nodata: Option<T>) -> Self {
        Self {
            grid,
            data: vec![value; grid.len()],
            nodata,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    pub fn get(&self, col: usize, row: usize) -> Option<T> {
        if col >= self.grid.width || row >= self.grid.height {
            return None;
        }
        Some(self.data[row * self.grid.width + col])
    }

    pub fn is_valid(&self, i: usize) -> bool {
        !self.data[i].is_missing(self.nodata)
    }

    pub fn valid_count(&self) -> usize {
        (0..self.data.len()).filter(|&i| self.is_valid(i)).count()
    }

    /// Copy a window out of this raster
    pub fn crop(&self, window: &Window) -> Raster<T> {
        let width = self.grid.width;
        let data = (window.row_off..window.row_off + window.height)
            .flat_map(|row| {
                let start = row * width + window.col_off;
                self.data[start..start + window.width].iter().copied()
            })
            .collect();

        Raster {
            grid: self.grid.sub_grid(window),
            data,
            nodata: self.nodata,
        }
    }
}
