use core::ops::{Deref, DerefMut};

use crate::matrix::Matrix;
use crate::vector::Vector;
use crate::degrees_to_radians;

/// 4×4 matrix that also knows how to compose projections and look-at views.
///
/// Derefs to [`Matrix`] so the general transforms (translate, rotate, invert, …)
/// are available too. None of those change the dimension, so a camera is
/// always 4×4.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Camera {
    matrix: Matrix,
}

impl Camera {
    /// Starts from the identity.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn into_matrix(self) -> Matrix {
        self.matrix
    }

    /// Composes an orthographic projection for the given clip planes.
    pub fn orthographic(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) -> &mut Self {
        self.matrix.compose(&[
            2.0 / (right - left), 0.0, 0.0, 0.0,
            0.0, 2.0 / (top - bottom), 0.0, 0.0,
            0.0, 0.0, 2.0 / (near - far), 0.0,
            (left + right) / (left - right),
            (bottom + top) / (bottom - top),
            (near + far) / (near - far),
            1.0,
        ]);
        self
    }

    /// Composes a symmetric perspective projection.
    ///
    /// `fov_degrees` is the vertical field of view.
    pub fn perspective(&mut self, fov_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> &mut Self {
        let f = (core::f32::consts::FRAC_PI_2 - 0.5 * degrees_to_radians(fov_degrees)).tan();
        let range = 1.0 / (near - far);

        self.matrix.compose(&[
            f / aspect_ratio, 0.0, 0.0, 0.0,
            0.0, f, 0.0, 0.0,
            0.0, 0.0, (near + far) * range, -1.0,
            0.0, 0.0, near * far * range * 2.0, 0.0,
        ]);
        self
    }

    /// Composes the frame of a viewer at `position` facing `target`.
    ///
    /// Rows are the x, y and z axes of the viewer followed by its position, so
    /// the result maps viewer space into world space. Invert it to get a view
    /// matrix. A `position` equal to `target`, or an `up` parallel to the view
    /// direction, yields NaN axes.
    pub fn look_at(&mut self, position: [f32; 3], target: [f32; 3], up: [f32; 3]) -> &mut Self {
        let mut z_axis = Vector::from(position);
        z_axis.operate_unchecked(&target, |a, b| a - b).normalize();

        let mut x_axis = Vector::from(up).cross_unchecked(z_axis.as_slice());
        x_axis.normalize();

        let mut y_axis = z_axis.cross_unchecked(x_axis.as_slice());
        y_axis.normalize();

        let (x, y, z) = (x_axis.as_slice(), y_axis.as_slice(), z_axis.as_slice());
        self.matrix.compose(&[
            x[0], x[1], x[2], 0.0,
            y[0], y[1], y[2], 0.0,
            z[0], z[1], z[2], 0.0,
            position[0], position[1], position[2], 1.0,
        ]);
        self
    }

    /// [`look_at`](Self::look_at) with +Y as up.
    pub fn look_at_y_up(&mut self, position: [f32; 3], target: [f32; 3]) -> &mut Self {
        self.look_at(position, target, [0.0, 1.0, 0.0])
    }
}

impl Deref for Camera {
    type Target = Matrix;

    fn deref(&self) -> &Matrix {
        &self.matrix
    }
}

impl DerefMut for Camera {
    fn deref_mut(&mut self) -> &mut Matrix {
        &mut self.matrix
    }
}

impl From<Camera> for Matrix {
    fn from(c: Camera) -> Self {
        c.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    // ── projections ───────────────────────────────────────────────────────

    #[test]
    fn perspective_90_square_has_unit_focal_length() {
        let mut cam = Camera::new();
        cam.perspective(90.0, 1.0, 0.1, 100.0);
        assert!(close(cam.point(0, 0).unwrap(), 1.0));
        assert!(close(cam.point(1, 1).unwrap(), 1.0));
        assert_eq!(cam.point(3, 2), Some(-1.0));
        assert_eq!(cam.point(3, 3), Some(0.0));
    }

    #[test]
    fn orthographic_maps_box_corners_to_clip_cube() {
        let mut cam = Camera::new();
        cam.orthographic(0.0, 800.0, 0.0, 600.0, -1.0, 1.0);

        let mut corner = Vector::from([800.0, 600.0, 0.0, 1.0]);
        corner.transform(&cam).unwrap();
        assert!(close(corner[0], 1.0));
        assert!(close(corner[1], -1.0));

        let mut origin = Vector::from([0.0, 0.0, 0.0, 1.0]);
        origin.transform(&cam).unwrap();
        assert!(close(origin[0], -1.0));
        assert!(close(origin[1], 1.0));
    }

    // ── look_at ───────────────────────────────────────────────────────────

    #[test]
    fn look_at_rows_are_orthonormal_axes() {
        let mut cam = Camera::new();
        cam.look_at([3.0, 2.0, 5.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]);

        for r in 0..3 {
            let axis = Vector::from(cam.row(r).unwrap()[..3].to_vec());
            assert!(close(axis.magnitude(), 1.0));
        }
        let x = Vector::from(cam.row(0).unwrap()[..3].to_vec());
        let z = Vector::from(cam.row(2).unwrap()[..3].to_vec());
        let dot: f32 = x.as_slice().iter().zip(z.as_slice()).map(|(a, b)| a * b).sum();
        assert!(close(dot, 0.0));
        assert_eq!(cam.row(3), Some(&[3.0, 2.0, 5.0, 1.0][..]));
    }

    #[test]
    fn look_at_down_negative_z_is_translation_only() {
        let mut cam = Camera::new();
        cam.look_at_y_up([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);
        let mut expected = Matrix::identity(4);
        expected.translate(0.0, 0.0, 5.0).unwrap();
        assert!(cam.as_slice().iter().zip(expected.as_slice()).all(|(a, b)| close(*a, *b)));
    }

    // ── end to end ────────────────────────────────────────────────────────

    #[test]
    fn perspective_then_look_at_projects_origin_with_nonzero_w() {
        let mut cam = Camera::new();
        cam.perspective(90.0, 1.0, 0.1, 100.0)
            .look_at_y_up([0.0, 0.0, 5.0], [0.0, 0.0, 0.0]);

        let mut origin = Vector::from([0.0, 0.0, 0.0, 1.0]);
        origin.transform(&cam).unwrap();

        assert_eq!(origin.len(), 4);
        assert!(origin.as_slice().iter().all(|c| c.is_finite()));
        assert!(close(origin[3], -5.0));
    }

    #[test]
    fn camera_stays_4x4_through_matrix_ops() {
        let mut cam = Camera::new();
        cam.translate(1.0, 2.0, 3.0).unwrap().rotate(10.0, 20.0, 30.0).unwrap();
        cam.invert().unwrap();
        assert!(cam.multiply(&Matrix::identity(3)).is_err());
        assert_eq!(cam.dim(), 4);
    }
}
