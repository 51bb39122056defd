use glam::{Mat4, Vec3};

/// Field-of-view sentinel meaning "derive this axis from the viewport aspect".
pub const FOV_DERIVE: f32 = -1.0;

/// Simple perspective camera: viewport, asymmetric field of view, world transform.
///
/// One of the two field-of-view axes is usually [`FOV_DERIVE`]; the other is
/// given in degrees and the missing axis follows from the viewport aspect.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSimple {
    viewport: (f32, f32),
    fov_horizontal: f32,
    fov_vertical: f32,
    transform: Mat4,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSimple {
    fn default() -> Self {
        Self {
            viewport: (1.0, 1.0),
            fov_horizontal: 60.0,
            fov_vertical: FOV_DERIVE,
            transform: Mat4::IDENTITY,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraSimple {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    /// Set horizontal and vertical field of view in degrees; either may be [`FOV_DERIVE`].
    pub fn set_field_of_view(&mut self, horizontal: f32, vertical: f32) {
        self.fov_horizontal = horizontal;
        self.fov_vertical = vertical;
    }

    /// Field of view as configured, sentinels included.
    pub fn field_of_view(&self) -> (f32, f32) {
        (self.fov_horizontal, self.fov_vertical)
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    pub fn aspect(&self) -> f32 {
        let (w, h) = self.viewport;
        if w <= 0.0 || h <= 0.0 { 1.0 } else { w / h }
    }

    /// Field of view in degrees with sentinels replaced by aspect-derived values.
    pub fn resolved_field_of_view(&self) -> (f32, f32) {
        let aspect = self.aspect();
        let derive = |given: f32, ratio: f32| {
            (2.0 * ((given.to_radians() * 0.5).tan() * ratio).atan()).to_degrees()
        };
        match (self.fov_horizontal < 0.0, self.fov_vertical < 0.0) {
            (false, true) => (self.fov_horizontal, derive(self.fov_horizontal, 1.0 / aspect)),
            (true, false) => (derive(self.fov_vertical, aspect), self.fov_vertical),
            (false, false) => (self.fov_horizontal, self.fov_vertical),
            (true, true) => (60.0, derive(60.0, 1.0 / aspect)),
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.transform.inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let (_, vertical) = self.resolved_field_of_view();
        Mat4::perspective_rh(vertical.to_radians(), self.aspect(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
