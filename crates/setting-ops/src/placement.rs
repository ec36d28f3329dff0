//! Prong placement around the stone silhouette.

use std::f64::consts::{PI, TAU};

use mesh_kernel::normalize_angle;
use mesh_kernel::sweep::polar_point;
use nalgebra::{Point3, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use setting_types::{ParameterError, ProngSpec};
use tracing::{debug, instrument};

use crate::error::GenerationError;
use crate::shapes::seat::{SeatPatch, SeatWindow, MIN_STATION_GAP};
use crate::shapes::{BandMetrics, Silhouette, StoneProfile};

/// Heights and radii shared by every part of one setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettingFrame {
    /// The band plane.
    pub band_top: f64,
    /// Plane the prong feet stand on: the band plane, or the top of a raised base.
    pub seat_z: f64,
    /// Height of the stone's girdle centre.
    pub girdle_z: f64,
    /// Outer radius of the band's flat top face.
    pub seat_outer: f64,
}

impl SettingFrame {
    pub fn new(band: &BandMetrics, prong: &ProngSpec) -> Self {
        let seat_z = band.top_z + prong.base_elevation();
        Self {
            band_top: band.top_z,
            seat_z,
            girdle_z: seat_z + prong.height,
            seat_outer: band.top_outer,
        }
    }
}

/// Where and how one prong stands.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementTransform {
    pub index: u32,
    /// Azimuth in `[0, 2π)`.
    pub azimuth: f64,
    /// Lean of the prong axis from vertical, toward the ring axis.
    pub tilt: f64,
    /// Radial distance from the tip in to the foot.
    pub horizontal_offset: f64,
    /// Centre of the foot on the seat plane.
    pub base: Point3<f64>,
    /// End of the prong shaft, `embrace_depth` outside the girdle.
    pub tip: Point3<f64>,
    /// Girdle point the tip stub closes onto.
    pub contact: Point3<f64>,
    /// Local +X radially outward, +Y tangential, +Z along the prong axis.
    pub orientation: UnitQuaternion<f64>,
    pub base_half_angle: f64,
    pub tip_half_angle: f64,
    /// Foot seat on a flat seat plane.
    pub base_seat: SeatPatch,
    /// Tip seat on the girdle.
    pub tip_seat: SeatPatch,
}

impl PlacementTransform {
    /// Unit vector from the ring axis toward the prong.
    pub fn radial(&self) -> Vector3<f64> {
        let (s, c) = self.azimuth.sin_cos();
        Vector3::new(c, s, 0.0)
    }

    /// Unit vector from foot to tip.
    pub fn axis(&self) -> Vector3<f64> {
        self.orientation * Vector3::z()
    }

    pub fn base_window(&self) -> SeatWindow {
        SeatWindow {
            azimuth: self.azimuth,
            half_angle: self.base_half_angle,
        }
    }

    pub fn tip_window(&self) -> SeatWindow {
        SeatWindow {
            azimuth: self.azimuth,
            half_angle: self.tip_half_angle,
        }
    }
}

/// Compute one transform per prong, evenly spaced around the stone.
#[instrument(skip_all, fields(count = prong.count))]
pub fn solve(
    silhouette: &Silhouette,
    profile: &StoneProfile,
    band: &BandMetrics,
    prong: &ProngSpec,
) -> Result<Vec<PlacementTransform>, GenerationError> {
    prong.validate()?;
    let frame = SettingFrame::new(band, prong);
    let n = prong.count;
    let sector = TAU / f64::from(n);
    let window_limit = PI / f64::from(n) - MIN_STATION_GAP;
    let phi0 = silhouette.grip_azimuth();
    let base_radius = frame.seat_outer - prong.thickness_base / 2.0;
    let half_girdle = profile.girdle / 2.0;

    let mut placements = Vec::with_capacity(n as usize);
    for index in 0..n {
        let azimuth = normalize_angle(phi0 + sector * f64::from(index));
        let radial = Vector3::new(azimuth.cos(), azimuth.sin(), 0.0);
        let r_s = silhouette.radius_at(azimuth);

        let contact = Point3::new(r_s * radial.x, r_s * radial.y, frame.girdle_z);
        let tip = contact + radial * prong.embrace_depth;
        let base = Point3::new(base_radius * radial.x, base_radius * radial.y, frame.seat_z);

        let horizontal_offset = base_radius - (r_s + prong.embrace_depth);
        if horizontal_offset <= MIN_STATION_GAP {
            return Err(ParameterError::new(
                "stone.width",
                2.0 * r_s,
                format!(
                    "stone reaches past the prong feet at radius {base_radius:.3} mm; \
                     use a larger band or a smaller stone"
                ),
            )
            .into());
        }
        let tilt = horizontal_offset.atan2(prong.height);

        let base_half_angle = (prong.thickness_base / 2.0) / base_radius;
        if base_half_angle >= window_limit {
            return Err(ParameterError::new(
                "prong.thickness_base",
                prong.thickness_base,
                format!("feet of {n} prongs overlap on the band"),
            )
            .into());
        }
        let tip_half_angle = (prong.thickness_top / 2.0) / r_s;
        if tip_half_angle >= window_limit {
            return Err(ParameterError::new(
                "prong.thickness_top",
                prong.thickness_top,
                format!("tips of {n} prongs overlap on the girdle"),
            )
            .into());
        }

        let axis = (tip - base).normalize();
        let outward = (radial - axis * radial.dot(&axis)).normalize();
        let tangent = axis.cross(&outward);
        let orientation = UnitQuaternion::from_rotation_matrix(
            &Rotation3::from_basis_unchecked(&[outward, tangent, axis]),
        );

        let row = |r: f64, half: f64, z: f64| {
            [-half, 0.0, half].map(|d| polar_point(r, normalize_angle(azimuth + d), z))
        };
        let base_seat = SeatPatch::band_top(
            row(frame.seat_outer - prong.thickness_base, base_half_angle, frame.seat_z),
            row(frame.seat_outer, base_half_angle, frame.seat_z),
        );
        let girdle_row = |z: f64| {
            [-tip_half_angle, 0.0, tip_half_angle].map(|d| {
                let p = silhouette.point_at(normalize_angle(azimuth + d));
                Point3::new(p.x, p.y, z)
            })
        };
        let tip_seat = SeatPatch::girdle(
            girdle_row(frame.girdle_z - half_girdle),
            girdle_row(frame.girdle_z + half_girdle),
        );

        debug!(index, azimuth, tilt, horizontal_offset, "prong placed");
        placements.push(PlacementTransform {
            index,
            azimuth,
            tilt,
            horizontal_offset,
            base,
            tip,
            contact,
            orientation,
            base_half_angle,
            tip_half_angle,
            base_seat,
            tip_seat,
        });
    }
    Ok(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use setting_types::{BandSpec, BaseStyle, StoneSpec};

    fn setup(stone: &StoneSpec) -> (Silhouette, StoneProfile, BandMetrics) {
        (
            Silhouette::from_spec(stone),
            StoneProfile::of(stone),
            BandMetrics::of(&BandSpec::flat(8.5, 1.0)),
        )
    }

    fn round() -> StoneSpec {
        StoneSpec::round(6.5, 6.5, 4.0)
    }

    #[test]
    fn azimuths_evenly_spaced() {
        let (s, p, b) = setup(&round());
        for n in [2u32, 4, 6, 8] {
            let prong = ProngSpec::new(n, 0.8, 0.5, 3.5);
            let placements = solve(&s, &p, &b, &prong).unwrap();
            assert_eq!(placements.len(), n as usize);
            for (i, pl) in placements.iter().enumerate() {
                assert_eq!(pl.index, i as u32);
                assert_relative_eq!(pl.azimuth, TAU * i as f64 / f64::from(n), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn scenario_geometry() {
        let (s, p, b) = setup(&round());
        let prong = ProngSpec::new(4, 0.8, 0.5, 3.5);
        let pl = &solve(&s, &p, &b, &prong).unwrap()[0];
        assert_relative_eq!(pl.base.x, 8.1, epsilon = 1e-12);
        assert_relative_eq!(pl.base.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(pl.contact.x, 3.25, epsilon = 1e-12);
        assert_relative_eq!(pl.contact.z, 4.5, epsilon = 1e-12);
        assert_relative_eq!(pl.tip.x, 3.35, epsilon = 1e-12);
        assert_relative_eq!(pl.horizontal_offset, 4.75, epsilon = 1e-12);
        assert_relative_eq!(pl.tilt, 4.75f64.atan2(3.5), epsilon = 1e-12);
    }

    #[test]
    fn orientation_frames_the_prong() {
        let (s, p, b) = setup(&round());
        let prong = ProngSpec::new(6, 0.8, 0.5, 3.5);
        for pl in solve(&s, &p, &b, &prong).unwrap() {
            let axis = pl.axis();
            assert_relative_eq!(axis, (pl.tip - pl.base).normalize(), epsilon = 1e-12);
            assert_relative_eq!(axis.angle(&Vector3::z()), pl.tilt, epsilon = 1e-12);
            let outward = pl.orientation * Vector3::x();
            assert!(outward.dot(&pl.radial()) > 0.0);
            let tangent = pl.orientation * Vector3::y();
            assert_relative_eq!(tangent.z, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn square_stone_prongs_on_corners() {
        let stone = StoneSpec::princess(5.0, 3.5);
        let (s, p, b) = setup(&stone);
        let prong = ProngSpec::new(4, 0.8, 0.5, 3.5);
        for pl in solve(&s, &p, &b, &prong).unwrap() {
            assert_relative_eq!(pl.contact.coords.xy().norm(), s.max_radius(), epsilon = 1e-9);
        }
    }

    #[test]
    fn radiant_prongs_on_outermost_corners() {
        let stone = StoneSpec::radiant(6.0, 4.2);
        let (s, p, b) = setup(&stone);
        let prong = ProngSpec::new(4, 0.8, 0.5, 3.5);
        let placements = solve(&s, &p, &b, &prong).unwrap();
        assert_relative_eq!(placements[0].azimuth, s.grip_azimuth(), epsilon = 1e-12);
        for pl in &placements {
            assert_relative_eq!(pl.contact.coords.xy().norm(), s.max_radius(), epsilon = 1e-9);
        }
    }

    #[test]
    fn taller_setting_raises_contact() {
        let (s, p, b) = setup(&round());
        let mut last = f64::NEG_INFINITY;
        for h in [1.5, 2.5, 3.5, 5.0] {
            let prong = ProngSpec::new(4, 0.8, 0.5, h);
            let z = solve(&s, &p, &b, &prong).unwrap()[0].contact.z;
            assert!(z > last);
            last = z;
        }
    }

    #[test]
    fn raised_base_lifts_seats() {
        let (s, p, b) = setup(&round());
        let prong = ProngSpec::new(4, 0.8, 0.5, 3.5).with_base_style(BaseStyle::Gallery);
        let pl = &solve(&s, &p, &b, &prong).unwrap()[0];
        assert_relative_eq!(pl.base.z, 2.0, epsilon = 1e-12);
        assert_relative_eq!(pl.contact.z, 5.5, epsilon = 1e-12);
        for q in &pl.base_seat.points {
            assert_relative_eq!(q.z, 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn oversized_stone_rejected() {
        let (s, p, b) = setup(&StoneSpec::round(16.0, 16.0, 4.0));
        let err = solve(&s, &p, &b, &ProngSpec::default()).unwrap_err();
        assert_eq!(err.field(), Some("stone.width"));
    }

    #[test]
    fn crowded_tips_rejected() {
        let (s, p, b) = setup(&StoneSpec::round(1.0, 1.0, 0.8));
        let prong = ProngSpec::new(8, 0.8, 0.6, 3.5);
        let err = solve(&s, &p, &b, &prong).unwrap_err();
        assert_eq!(err.field(), Some("prong.thickness_top"));
    }

    #[test]
    fn seats_face_their_hosts() {
        let (s, p, b) = setup(&round());
        let prong = ProngSpec::new(4, 0.8, 0.5, 3.5);
        for pl in solve(&s, &p, &b, &prong).unwrap() {
            assert!(pl.base_seat.area_normal().z > 0.0);
            assert!(pl.tip_seat.area_normal().dot(&pl.radial()) > 0.0);
            let c = pl.tip_seat.centroid();
            assert_relative_eq!(c.z, pl.contact.z, epsilon = 1e-12);
        }
    }

    proptest::proptest! {
        #[test]
        fn spacing_holds_for_any_oval(
            width in 3.0f64..9.0,
            length in 3.0f64..9.0,
            half_count in 1u32..=4,
            height in 0.5f64..6.0,
        ) {
            let stone = StoneSpec::round(width, length, 3.0);
            let (s, p, _) = setup(&stone);
            let band = BandMetrics::of(&BandSpec::flat(12.0, 1.5));
            let prong = ProngSpec::new(2 * half_count, 0.8, 0.5, height);
            let placements = solve(&s, &p, &band, &prong).unwrap();
            let step = TAU / f64::from(prong.count);
            for w in placements.windows(2) {
                proptest::prop_assert!((w[1].azimuth - w[0].azimuth - step).abs() < 1e-9);
            }
            for pl in &placements {
                proptest::prop_assert!(pl.tilt > 0.0 && pl.tilt < PI / 2.0);
                proptest::prop_assert!((pl.contact.z - pl.base.z - height).abs() < 1e-12);
            }
        }
    }
}
