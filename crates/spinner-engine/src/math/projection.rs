use glam::Mat4;

/// GL-convention perspective projection.
///
/// `fovy_degrees` is the full vertical field of view. The frustum maps eye
/// space `z` in `[-near, -far]` to clip `z` in `[-w, w]`.
pub fn perspective(fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fovy_degrees.to_radians(), aspect, near, far)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frustum built from `top = near * tan(fovy / 2)`, `right = top * aspect`.
    fn frustum_reference(fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> [f32; 16] {
        let top = near * (fovy_degrees.to_radians() / 2.0).tan();
        let right = top * aspect;
        let mut m = [0.0; 16];
        m[0] = near / right;
        m[5] = near / top;
        m[10] = -(far + near) / (far - near);
        m[11] = -1.0;
        m[14] = -(far * near * 2.0) / (far - near);
        m
    }

    #[test]
    fn matches_frustum_construction() {
        let p = perspective(45.0, 16.0 / 9.0, 0.1, 100.0).to_cols_array();
        let r = frustum_reference(45.0, 16.0 / 9.0, 0.1, 100.0);
        for (a, b) in p.iter().zip(r.iter()) {
            assert!((a - b).abs() < 1e-4, "{p:?} != {r:?}");
        }
    }

    #[test]
    fn near_and_far_planes_map_to_clip_bounds() {
        let p = perspective(45.0, 1.0, 0.1, 100.0);
        let near = p * glam::Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = p * glam::Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }
}
