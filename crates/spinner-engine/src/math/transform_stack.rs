use glam::{Mat4, Vec3};

use crate::error::{RenderError, Result};

/// Save/restore stack of model-view matrices.
///
/// `push` snapshots the current matrix; the matching `pop` restores exactly
/// that snapshot, whatever was applied in between. This lets an object-local
/// rotation be applied without disturbing the shared placement chain.
#[derive(Debug, Clone)]
pub struct TransformStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl TransformStack {
    /// Identity current matrix, nothing saved.
    pub fn new() -> Self {
        Self {
            current: Mat4::IDENTITY,
            saved: Vec::new(),
        }
    }

    #[inline]
    pub fn current(&self) -> Mat4 {
        self.current
    }

    /// Number of outstanding pushes.
    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Resets the current matrix to identity. Saved snapshots are untouched.
    pub fn load_identity(&mut self) {
        self.current = Mat4::IDENTITY;
    }

    /// Drops all saved snapshots.
    pub fn clear(&mut self) {
        self.saved.clear();
    }

    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restores the most recent snapshot.
    ///
    /// Fails with [`RenderError::EmptyStack`] when there is no matching push;
    /// the current matrix is left unchanged in that case.
    pub fn pop(&mut self) -> Result<()> {
        self.current = self.saved.pop().ok_or(RenderError::EmptyStack)?;
        Ok(())
    }

    pub fn translate(&mut self, v: Vec3) {
        self.current *= Mat4::from_translation(v);
    }

    /// Rotates by `angle_degrees` about `axis`.
    ///
    /// The axis is normalized first, so only its direction matters. A zero
    /// axis has no direction and leaves the matrix unchanged.
    pub fn rotate(&mut self, angle_degrees: f32, axis: Vec3) {
        let Some(axis) = axis.try_normalize() else {
            log::warn!("rotate: zero-length axis ignored");
            return;
        };
        self.current *= Mat4::from_axis_angle(axis, angle_degrees.to_radians());
    }
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    // ── push / pop ────────────────────────────────────────────────────────

    #[test]
    fn pop_on_empty_stack_fails() {
        let mut s = TransformStack::new();
        assert_eq!(s.pop(), Err(RenderError::EmptyStack));
    }

    #[test]
    fn failed_pop_keeps_current() {
        let mut s = TransformStack::new();
        s.translate(Vec3::new(1.0, 2.0, 3.0));
        let before = s.current();
        assert!(s.pop().is_err());
        assert_eq!(s.current(), before);
    }

    #[test]
    fn push_rotate_pop_restores_snapshot() {
        let mut s = TransformStack::new();
        s.translate(Vec3::new(-1.5, 0.0, -8.0));
        let before = s.current();

        s.push();
        s.rotate(90.0, Vec3::Y);
        assert!(!s.current().abs_diff_eq(before, EPS));
        s.pop().unwrap();

        assert!(s.current().abs_diff_eq(before, EPS));
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn nested_pushes_restore_in_reverse_order() {
        let mut s = TransformStack::new();
        let m0 = s.current();

        s.push();
        s.translate(Vec3::X);
        let m1 = s.current();

        s.push();
        s.rotate(30.0, Vec3::Z);
        s.translate(Vec3::Y);
        assert_eq!(s.depth(), 2);

        s.pop().unwrap();
        assert!(s.current().abs_diff_eq(m1, EPS));
        s.pop().unwrap();
        assert!(s.current().abs_diff_eq(m0, EPS));
        assert_eq!(s.pop(), Err(RenderError::EmptyStack));
    }

    #[test]
    fn balanced_sequences_return_to_start() {
        // Every prefix has pushes >= pops; the whole sequence is balanced.
        let ops = "(t(r)t)(r(t(r)))";
        let mut s = TransformStack::new();
        s.translate(Vec3::new(0.5, -2.0, 4.0));
        let start = s.current();

        for (i, op) in ops.chars().enumerate() {
            let angle = 17.0 * i as f32;
            match op {
                '(' => s.push(),
                ')' => s.pop().unwrap(),
                't' => s.translate(Vec3::new(angle, 1.0, -angle)),
                'r' => s.rotate(angle, Vec3::new(1.0, 2.0, 3.0)),
                _ => unreachable!(),
            }
        }

        assert_eq!(s.depth(), 0);
        assert!(s.current().abs_diff_eq(start, EPS));
    }

    #[test]
    fn load_identity_keeps_saved_snapshots() {
        let mut s = TransformStack::new();
        s.translate(Vec3::X);
        s.push();
        s.load_identity();
        assert_eq!(s.current(), Mat4::IDENTITY);
        assert_eq!(s.depth(), 1);
        s.clear();
        assert_eq!(s.depth(), 0);
    }

    // ── translate / rotate ────────────────────────────────────────────────

    #[test]
    fn translate_post_multiplies() {
        let mut s = TransformStack::new();
        s.translate(Vec3::new(-1.5, 0.0, -8.0));
        s.translate(Vec3::new(3.0, 0.0, 0.0));
        let origin = s.current().transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(Vec3::new(1.5, 0.0, -8.0), EPS));
    }

    #[test]
    fn rotation_applies_in_local_frame() {
        let mut s = TransformStack::new();
        s.translate(Vec3::new(0.0, 0.0, -8.0));
        s.rotate(90.0, Vec3::Y);
        // Local +X rotates to -Z, then the translation is applied.
        let p = s.current().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -9.0), 1e-5));
    }

    #[test]
    fn rotation_axis_magnitude_is_ignored() {
        let mut a = TransformStack::new();
        let mut b = TransformStack::new();
        a.rotate(-37.5, Vec3::ONE);
        b.rotate(-37.5, Vec3::ONE.normalize());
        assert!(a.current().abs_diff_eq(b.current(), EPS));
    }

    #[test]
    fn zero_axis_rotation_is_a_no_op() {
        let mut s = TransformStack::new();
        s.translate(Vec3::Z);
        let before = s.current();
        s.rotate(45.0, Vec3::ZERO);
        assert_eq!(s.current(), before);
    }
}
