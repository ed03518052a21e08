//! Transmission math shared by every association

use crate::occlusion::{AbsorptionModel, Raycasting};
use crate::world::{ActorView, WorldContext, floor_to_cell};
use glam::{DVec3, IVec3};
use hazard_rules::{Falloff, MIN_EFFECTIVE_INTENSITY};

/// Point-source parameters pulled out of a transmission rule
#[derive(Clone, Copy, Debug)]
pub(crate) struct PointEmission {
    pub base_intensity: f64,
    pub max_distance: f64,
    pub requires_line_of_sight: bool,
    pub air_attenuation_per_unit: f64,
}

/// Sky parameters pulled out of a transmission rule
#[derive(Clone, Copy, Debug)]
pub(crate) struct SkyEmission {
    pub base_intensity: f64,
    pub requires_direct_sky: bool,
    pub rain_multiplier: f64,
    pub thunder_multiplier: f64,
    pub night_multiplier: f64,
    pub indoor_leak: f64,
}

/// Unblocked point intensity at `distance`, zero past the cut-off
pub(crate) fn point_raw(falloff: &Falloff, emission: &PointEmission, distance: f64) -> f64 {
    if emission.max_distance > 0.0 && distance > emission.max_distance {
        return 0.0;
    }
    let decayed = falloff.apply(emission.base_intensity, distance, emission.max_distance);
    let air = if emission.air_attenuation_per_unit > 0.0 {
        (-emission.air_attenuation_per_unit * distance).exp()
    } else {
        1.0
    };
    let raw = (decayed * air).max(0.0);
    if raw.is_nan() || raw <= MIN_EFFECTIVE_INTENSITY {
        0.0
    } else {
        raw
    }
}

/// Point intensity at the actor after voxel blocking
///
/// The better of the body and eye rays wins.
pub(crate) fn point_blocked(
    model: Option<&mut AbsorptionModel>,
    ctx: &WorldContext<'_>,
    emission: &PointEmission,
    source: DVec3,
    actor: &ActorView,
    raw: f64,
) -> f64 {
    if raw <= MIN_EFFECTIVE_INTENSITY {
        return 0.0;
    }
    let Some(model) = model else {
        return raw;
    };
    if !emission.requires_line_of_sight {
        return raw;
    }

    let cutoff = MIN_EFFECTIVE_INTENSITY / raw;
    let (voxels, catalog) = (ctx.voxels, ctx.catalog);
    let body = Raycasting::line_factor(model, voxels, catalog, source, actor.body_point(), cutoff);
    let eye = Raycasting::line_factor(model, voxels, catalog, source, actor.eye_point(), cutoff);
    raw * body.max(eye)
}

/// Sky intensity at the actor, weather and shelter applied
pub(crate) fn sky_intensity(
    model: Option<&mut AbsorptionModel>,
    ctx: &WorldContext<'_>,
    emission: &SkyEmission,
    actor: &ActorView,
) -> f64 {
    let env = ctx.environment;
    let mut intensity = emission.base_intensity;
    if env.is_night() {
        intensity *= emission.night_multiplier;
    }
    if env.is_thundering() {
        intensity *= emission.thunder_multiplier;
    } else if env.is_raining() {
        intensity *= emission.rain_multiplier;
    }
    if emission.requires_direct_sky && !ctx.voxels.can_see_sky(actor.cell()) {
        intensity *= emission.indoor_leak;
    }
    let intensity = if intensity.is_nan() { 0.0 } else { intensity.max(0.0) };

    let Some(model) = model else {
        return intensity;
    };
    if intensity <= MIN_EFFECTIVE_INTENSITY {
        return 0.0;
    }

    let top_y = ctx.voxels.ceiling_height() - 1;
    let eye_cell = floor_to_cell(actor.eye_point());
    if top_y <= eye_cell.y {
        return intensity;
    }

    let cutoff = MIN_EFFECTIVE_INTENSITY / intensity;
    let top = IVec3::new(eye_cell.x, top_y, eye_cell.z);
    let body_y = floor_to_cell(actor.body_point()).y;
    let body = Raycasting::vertical_factor(model, ctx.voxels, ctx.catalog, top, body_y, cutoff);
    let eye = Raycasting::vertical_factor(model, ctx.voxels, ctx.catalog, top, eye_cell.y, cutoff);
    intensity * body.max(eye)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emission(max_distance: f64, air: f64) -> PointEmission {
        PointEmission {
            base_intensity: 1.0,
            max_distance,
            requires_line_of_sight: true,
            air_attenuation_per_unit: air,
        }
    }

    #[test]
    fn test_point_raw_exponential_with_air() {
        let falloff = Falloff::Exponential { k: 0.18 };
        let raw = point_raw(&falloff, &emission(12.0, 0.05), 10.0);
        let expected = (-0.18f64 * 10.0).exp() * (-0.05f64 * 10.0).exp();
        assert!((raw - expected).abs() < 1e-12);
        assert!((raw - 0.1003).abs() < 1e-3);
    }

    #[test]
    fn test_point_raw_beyond_cutoff_is_zero() {
        let falloff = Falloff::Exponential { k: 0.18 };
        assert_eq!(point_raw(&falloff, &emission(12.0, 0.05), 13.0), 0.0);
        assert!(point_raw(&falloff, &emission(0.0, 0.05), 13.0) > 0.0);
    }

    #[test]
    fn test_point_raw_below_threshold_is_zero() {
        let falloff = Falloff::Exponential { k: 5.0 };
        assert_eq!(point_raw(&falloff, &emission(0.0, 0.0), 10.0), 0.0);
    }

    #[test]
    fn test_point_raw_zero_distance_unattenuated() {
        let falloff = Falloff::InverseSquare { min_distance: 1.0 };
        assert_eq!(point_raw(&falloff, &emission(12.0, 0.05), 0.0), 1.0);
    }
}
