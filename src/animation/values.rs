use glam::{Quat, Vec3, Vec4};

/// Values a keyframe track can hold.
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;

    /// glTF cubic spline: `out_tangent0` / `in_tangent1` are scaled by the key
    /// interval `dt`.
    fn interpolate_cubic(
        v0: Self,
        out_tangent0: Self,
        in_tangent1: Self,
        v1: Self,
        t: f32,
        dt: f32,
    ) -> Self;
}

/// Hermite basis `[s0, s1, s2, s3]` for value0, tangent0, value1, tangent1.
#[inline]
fn hermite(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    let s2 = -2.0 * t3 + 3.0 * t2;
    let s3 = t3 - t2;
    [1.0 - s2, s3 - t2 + t, s2, s3]
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(v0: Self, m0: Self, m1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [s0, s1, s2, s3] = hermite(t);
        s0 * v0 + s1 * m0 * dt + s2 * v1 + s3 * m1 * dt
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }

    fn interpolate_cubic(v0: Self, m0: Self, m1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [s0, s1, s2, s3] = hermite(t);
        v0 * s0 + m0 * (s1 * dt) + v1 * s2 + m1 * (s3 * dt)
    }
}

impl Interpolatable for Quat {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }

    fn interpolate_cubic(v0: Self, m0: Self, m1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let [s0, s1, s2, s3] = hermite(t);
        let v = Vec4::from(v0) * s0
            + Vec4::from(m0) * (s1 * dt)
            + Vec4::from(v1) * s2
            + Vec4::from(m1) * (s3 * dt);
        Quat::from_vec4(v).normalize()
    }
}
