//! Column-major 4x4 model-view matrix for 2D map transforms.
//!
//! Values are stored as `f32` because the matrix is uploaded straight to a
//! uniform, but every operation computes in `f64` and rounds once when the
//! result is stored. That keeps results identical to a `Float32Array`
//! built up by the same sequence of operations.
//!
//! Only 2D translate and scale are provided, so elements 2, 3, 6, 7 and
//! 8..=11 always keep their identity values.

use glam::Mat4;

/// A 4x4 affine transform in column-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelViewMatrix([f32; 16]);

impl Default for ModelViewMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl ModelViewMatrix {
    #[rustfmt::skip]
    const IDENTITY: [f32; 16] = [
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ];

    pub const fn identity() -> Self {
        Self(Self::IDENTITY)
    }

    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self(m)
    }

    /// Post-multiplies by a translation: column 3 gains `x * col0 + y * col1`.
    ///
    /// Because the offset goes through the existing columns, a translate
    /// after a scale moves by scaled units.
    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        let m = &mut self.0;
        for row in 0..4 {
            let v = m[12 + row] as f64 + m[row] as f64 * x + m[4 + row] as f64 * y;
            m[12 + row] = v as f32;
        }
        self
    }

    /// Post-multiplies by a scale: column 0 is multiplied by `x` and column 1
    /// by `y`. Columns 2 and 3 are left untouched.
    pub fn scale(&mut self, x: f64, y: f64) -> &mut Self {
        let m = &mut self.0;
        for row in 0..4 {
            m[row] = (m[row] as f64 * x) as f32;
            m[4 + row] = (m[4 + row] as f64 * y) as f32;
        }
        self
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn to_cols_array(self) -> [f32; 16] {
        self.0
    }
}

impl From<ModelViewMatrix> for Mat4 {
    fn from(m: ModelViewMatrix) -> Self {
        Mat4::from_cols_array(&m.0)
    }
}

/// Scale factor for a (possibly fractional) zoom level: exactly `2^zoom`.
pub fn zoom_scale(zoom: f64) -> f64 {
    2f64.powf(zoom)
}
