//! The generation pipeline: specs in, designer and production meshes out.

use mesh_kernel::{StitchKernel, UnionKernel};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use setting_types::{BandSpec, BaseStyle, ParameterError, ProngSpec, StoneSpec};
use tracing::{debug, info, instrument};

use crate::assembly::{DesignerMesh, Fragment, MeshAssembler, PartKind, ProductionMesh};
use crate::base::build_base;
use crate::clearance::{self, ClearancePolicy, ClearanceReport, ClearanceScene};
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::placement::{self, PlacementTransform, SettingFrame};
use crate::prong::{build_anchored, ProngMesh};
use crate::shapes::{
    build_band_seated, build_stone_seated, BandMetrics, BandSeating, Silhouette, StoneProfile,
};

/// One parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingRequest {
    pub stone: StoneSpec,
    pub band: BandSpec,
    #[serde(default)]
    pub prong: ProngSpec,
}

impl SettingRequest {
    pub fn new(stone: StoneSpec, band: BandSpec, prong: ProngSpec) -> Self {
        Self { stone, band, prong }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        self.stone.validate()?;
        self.band.validate()?;
        self.prong.validate()
    }
}

/// Everything produced for one request.
#[derive(Debug, Clone)]
pub struct SettingOutput {
    pub designer: DesignerMesh,
    pub production: ProductionMesh,
    pub frame: SettingFrame,
    pub placements: Vec<PlacementTransform>,
    pub clearance: ClearanceReport,
}

/// Positioned parts, before clearance and assembly.
struct SettingParts {
    frame: SettingFrame,
    placements: Vec<PlacementTransform>,
    stone: mesh_kernel::TriMesh,
    band: mesh_kernel::TriMesh,
    base: Option<mesh_kernel::TriMesh>,
    prongs: Vec<ProngMesh>,
}

impl SettingParts {
    fn into_fragments(self) -> Vec<Fragment> {
        let mut fragments = Vec::with_capacity(self.prongs.len() + 3);
        fragments.push(Fragment::new(PartKind::Band, self.band));
        if let Some(base) = self.base {
            fragments.push(Fragment::new(PartKind::Base, base));
        }
        fragments.extend(
            self.prongs
                .into_iter()
                .map(|p| Fragment::new(PartKind::Prong(p.index), p.mesh)),
        );
        fragments.push(Fragment::new(PartKind::Stone, self.stone));
        fragments
    }
}

/// Configured pipeline with a pluggable union kernel.
pub struct Generator {
    config: GeneratorConfig,
    kernel: Box<dyn UnionKernel>,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl Generator {
    /// Generator with the stitching kernel at the configured weld resolution.
    pub fn new(config: GeneratorConfig) -> Self {
        let kernel = StitchKernel {
            weld_resolution: config.weld_resolution,
        };
        Self {
            config,
            kernel: Box::new(kernel),
        }
    }

    /// Replace the union kernel used for production meshes.
    pub fn with_kernel(mut self, kernel: Box<dyn UnionKernel>) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Check the configuration and request without building anything.
    pub fn validate(&self, request: &SettingRequest) -> Result<(), GenerationError> {
        self.config.validate()?;
        request.validate()?;
        Ok(())
    }

    /// Run the full pipeline.
    #[instrument(skip_all, fields(shape = ?request.stone.shape, prongs = request.prong.count))]
    pub fn generate(&self, request: &SettingRequest) -> Result<SettingOutput, GenerationError> {
        let parts = self.build_parts(request)?;

        let report = clearance::check(
            &ClearanceScene {
                stone: &parts.stone,
                band: &parts.band,
                base: parts.base.as_ref(),
                prongs: &parts.prongs,
            },
            &self.config.clearance,
        )?;

        let frame = parts.frame;
        let placements = parts.placements.clone();
        let assembler = MeshAssembler::new(self.kernel.as_ref(), self.config.production);
        let (designer, production) = assembler.assemble(parts.into_fragments())?;

        info!(
            fragments = designer.fragments.len(),
            triangles = production.mesh.triangle_count(),
            genus = ?production.genus(),
            min_clearance = ?report.min_distance(),
            "setting generated"
        );
        Ok(SettingOutput {
            designer,
            production,
            frame,
            placements,
            clearance: report,
        })
    }

    /// Build only the designer scene. Clearance is not checked.
    #[instrument(skip_all, fields(shape = ?request.stone.shape, prongs = request.prong.count))]
    pub fn generate_designer(&self, request: &SettingRequest) -> Result<DesignerMesh, GenerationError> {
        let parts = self.build_parts(request)?;
        let assembler = MeshAssembler::new(self.kernel.as_ref(), self.config.production);
        Ok(assembler.designer(parts.into_fragments()))
    }

    fn build_parts(&self, request: &SettingRequest) -> Result<SettingParts, GenerationError> {
        self.validate(request)?;
        let tess = &self.config.tessellation;
        let SettingRequest { stone, band, prong } = request;

        let silhouette = Silhouette::from_spec(stone);
        let metrics = BandMetrics::of(band);
        let placements = placement::solve(&silhouette, &StoneProfile::of(stone), &metrics, prong)?;
        let frame = SettingFrame::new(&metrics, prong);

        let tip_windows: Vec<_> = placements.iter().map(|p| p.tip_window()).collect();
        let mut stone_mesh = build_stone_seated(stone, tess.stone_segments, &tip_windows)?;
        stone_mesh.translate(&Vector3::new(0.0, 0.0, frame.girdle_z));

        let seating = BandSeating {
            windows: placements.iter().map(|p| p.base_window()).collect(),
            seat_depth: prong.thickness_base,
            rail_width: if prong.base_style.is_raised() {
                prong.base_width
            } else {
                prong.thickness_base
            },
        };
        let band_mesh = build_band_seated(band, tess, &seating)?;
        let base = build_base(&band_mesh, prong)?;

        let mut prongs = Vec::with_capacity(placements.len());
        for (i, pl) in placements.iter().enumerate() {
            let foot = match &base {
                Some(base) => base.seats.get(i).map(|s| s.patch(&base.mesh)),
                None => band_mesh.seats.get(i).map(|s| s.patch(&band_mesh.mesh)),
            };
            let head = stone_mesh.seats.get(i).map(|s| s.patch(&stone_mesh.mesh));
            let (Some(foot), Some(head)) = (foot, head) else {
                return Err(GenerationError::AssemblyFailure {
                    reason: format!("no seat for prong {}", pl.index),
                });
            };
            prongs.push(build_anchored(pl, prong, tess, &foot?, &head?)?);
        }

        debug!(
            stone = stone_mesh.mesh.triangle_count(),
            band = band_mesh.mesh.triangle_count(),
            base = base.as_ref().map_or(0, |b| b.mesh.triangle_count()),
            prongs = prongs.len(),
            "parts built"
        );
        Ok(SettingParts {
            frame,
            placements,
            stone: stone_mesh.mesh,
            band: band_mesh.mesh,
            base: base.map(|b| b.mesh),
            prongs,
        })
    }
}

/// Generate a setting with default configuration.
///
/// `base_style` overrides `prong.base_style`.
pub fn generate(
    stone: StoneSpec,
    band: BandSpec,
    prong: ProngSpec,
    base_style: BaseStyle,
    clearance_policy: ClearancePolicy,
) -> Result<SettingOutput, GenerationError> {
    let config = GeneratorConfig {
        clearance: clearance_policy,
        ..GeneratorConfig::default()
    };
    let request = SettingRequest::new(stone, band, prong.with_base_style(base_style));
    Generator::new(config).generate(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clearance::ClearancePair;
    use approx::assert_relative_eq;
    use mesh_kernel::{KernelError, TriMesh, UnionOutput};

    fn scenario() -> SettingRequest {
        SettingRequest::new(
            StoneSpec::round(6.5, 6.5, 4.0),
            BandSpec::flat(8.5, 1.0),
            ProngSpec::new(4, 0.8, 0.5, 3.5),
        )
    }

    #[test]
    fn scenario_generates_closed_solid() {
        let out = Generator::new(GeneratorConfig::preview())
            .generate(&scenario())
            .unwrap();
        assert!(out.production.topology.is_single_solid());
        assert_eq!(out.production.genus(), Some(4));
        assert_eq!(out.designer.prong_count(), 4);
        assert_eq!(out.designer.fragments.len(), 6);
        assert!(!out.clearance.skipped);
        assert!(out.clearance.min_distance().unwrap() >= 0.01);
        assert_eq!(out.production.frame.name, "setting");
    }

    #[test]
    fn free_function_applies_base_style() {
        let req = scenario();
        let out = generate(
            req.stone,
            req.band,
            req.prong,
            BaseStyle::Individual,
            ClearancePolicy::default(),
        )
        .unwrap();
        assert!(out.designer.fragment(PartKind::Base).is_none());
        assert_relative_eq!(out.frame.girdle_z, 4.5, epsilon = 1e-12);
    }

    #[test]
    fn invalid_prong_rejected_before_meshing() {
        let mut req = scenario();
        req.prong.thickness_top = 1.0;
        let err = Generator::default().generate(&req).unwrap_err();
        assert_eq!(err.field(), Some("prong.thickness_top"));
        let err = Generator::default().generate_designer(&req).unwrap_err();
        assert_eq!(err.field(), Some("prong.thickness_top"));
    }

    #[test]
    fn designer_skips_clearance() {
        let mut config = GeneratorConfig::preview();
        // Wider than the gap between a prong shaft and the pavilion.
        config.clearance.min_gap = 2.0;
        let generator = Generator::new(config);
        let err = generator.generate(&scenario()).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::GeometryInfeasible {
                pair: ClearancePair::ProngStone { .. },
                ..
            }
        ));
        let designer = generator.generate_designer(&scenario()).unwrap();
        assert_eq!(designer.fragments.len(), 6);
    }

    struct RefusingKernel;

    impl UnionKernel for RefusingKernel {
        fn name(&self) -> &'static str {
            "refusing"
        }

        fn union(&self, _parts: &[&TriMesh]) -> Result<UnionOutput, KernelError> {
            Err(KernelError::UnionFailed {
                reason: "no solid modeller".to_string(),
            })
        }
    }

    #[test]
    fn kernel_failure_yields_no_output() {
        let generator = Generator::new(GeneratorConfig::preview()).with_kernel(Box::new(RefusingKernel));
        let err = generator.generate(&scenario()).unwrap_err();
        assert!(matches!(err, GenerationError::AssemblyFailure { .. }));
    }

    #[test]
    fn request_json_uses_prong_defaults() {
        let req = SettingRequest::from_json(
            r#"{
                "stone": {"shape": "round", "width": 6.5, "length": 6.5, "depth": 4.0},
                "band": {"outer_radius": 8.5, "thickness": 1.0, "profile": {"type": "flat"}}
            }"#,
        )
        .unwrap();
        assert_eq!(req.prong, ProngSpec::default());
        assert_eq!(req.band.width, 2.0);
        assert!(req.validate().is_ok());
    }
}
