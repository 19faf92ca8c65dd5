// Kinematic helpers and physical constants shared by the collision physics.

use nalgebra::Vector3;

use crate::rng::RandomStream;

/// Electron rest-mass energy in MeV.
pub const ELECTRON_REST_MASS_ENERGY: f64 = 0.51099891013;

/// Relativistic speed ratio (v/c) of an electron with kinetic energy
/// `energy` (MeV).
#[inline]
pub fn electron_speed_ratio(energy: f64) -> f64 {
    debug_assert!(energy > 0.0);

    (energy * (energy + 2.0 * ELECTRON_REST_MASS_ENERGY)).sqrt()
        / (energy + ELECTRON_REST_MASS_ENERGY)
}

/// Rotate a unit direction to a new direction with polar cosine `mu`
/// relative to the original and azimuthal angle `phi` about it.
pub fn rotate_direction_3d(u_old: &Vector3<f64>, mu: f64, phi: f64) -> Vector3<f64> {
    debug_assert!((-1.0..=1.0).contains(&mu));

    let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();

    // Find a perpendicular vector to u_old
    let perp = if u_old.x.abs() < 0.99 {
        Vector3::new(1.0, 0.0, 0.0).cross(u_old).normalize()
    } else {
        Vector3::new(0.0, 1.0, 0.0).cross(u_old).normalize()
    };
    let ortho = u_old.cross(&perp);

    mu * u_old + sin_theta * phi.cos() * perp + sin_theta * phi.sin() * ortho
}

/// Sample an azimuthal angle uniformly in [0, 2*pi).
#[inline]
pub fn sample_azimuthal_angle<S: RandomStream>(stream: &mut S) -> f64 {
    2.0 * std::f64::consts::PI * stream.sample()
}

/// Sample an isotropic unit direction.
pub fn sample_isotropic_direction<S: RandomStream>(stream: &mut S) -> [f64; 3] {
    let mu = 2.0 * stream.sample() - 1.0;
    let phi = sample_azimuthal_angle(stream);
    let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();

    [sin_theta * phi.cos(), sin_theta * phi.sin(), mu]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FakeStream;
    use approx::assert_relative_eq;

    #[test]
    fn test_electron_speed_ratio_limits() {
        // Low energy: beta ~ sqrt(2 E / mc^2)
        let e = 1e-6;
        let beta = electron_speed_ratio(e);
        assert_relative_eq!(
            beta,
            (2.0 * e / ELECTRON_REST_MASS_ENERGY).sqrt(),
            max_relative = 1e-5
        );

        // High energy: beta -> 1
        assert!(electron_speed_ratio(1e4) > 0.999999);
    }

    #[test]
    fn test_rotate_direction_preserves_norm_and_cosine() {
        let u = Vector3::new(0.0, 0.0, 1.0);
        let v = rotate_direction_3d(&u, 0.5, 1.3);
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(v.dot(&u), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_isotropic_direction_from_fixed_stream() {
        let mut stream = FakeStream::new(vec![0.5, 0.5]);
        let d = sample_isotropic_direction(&mut stream);
        // mu = 0, phi = pi
        assert_relative_eq!(d[0], -1.0, epsilon = 1e-12);
        assert_relative_eq!(d[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(d[2], 0.0, epsilon = 1e-12);
    }
}
