//! Toestandsmachine die de camera langs de regio's van interesse beweegt.
//!
//! Per ROI doorloopt de animator de cyclus
//! `ZoomIn -> Turntable -> ZoomOut -> RoiChange -> ZoomIn`. Na de laatste ROI
//! springt de cursor terug naar "geen selectie" en volgt een pass over het
//! volledige lichaam voordat de cyclus opnieuw begint.

use serde::Serialize;

use super::highlight::MeshHighlight;
use super::pose::{CameraPose, CameraRig};
use crate::config::{AnimationSettings, ViewerConfig};
use crate::report::Report;

/// Actieve fase van de animatie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimationPhase {
    ZoomIn,
    Turntable,
    ZoomOut,
    RoiChange,
}

impl AnimationPhase {
    /// Volgende fase in de vaste cyclus.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::ZoomIn => Self::Turntable,
            Self::Turntable => Self::ZoomOut,
            Self::ZoomOut => Self::RoiChange,
            Self::RoiChange => Self::ZoomIn,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ZoomIn => "ZOOM_IN",
            Self::Turntable => "TURNTABLE",
            Self::ZoomOut => "ZOOM_OUT",
            Self::RoiChange => "ROI_CHANGE",
        }
    }
}

/// Navigatierichting voor de vorige/volgende knoppen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Index in de ROI-lijst; `None` betekent het volledige lichaam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiCursor {
    index: Option<usize>,
    len: usize,
}

impl RoiCursor {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { index: None, len }
    }

    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    #[must_use]
    pub const fn is_full_body(&self) -> bool {
        self.index.is_none()
    }

    /// Een stap vooruit; na de laatste ROI volgt "geen selectie".
    pub fn advance(&mut self) {
        self.index = match self.index {
            None if self.len > 0 => Some(0),
            Some(index) if index + 1 < self.len => Some(index + 1),
            _ => None,
        };
    }

    /// Een stap terug; voor "geen selectie" komt de laatste ROI.
    pub fn retreat(&mut self) {
        self.index = match self.index {
            None => self.len.checked_sub(1),
            Some(0) => None,
            Some(index) => Some(index - 1),
        };
    }

    pub fn step(&mut self, direction: Direction) {
        match direction {
            Direction::Next => self.advance(),
            Direction::Previous => self.retreat(),
        }
    }

    pub fn reset(&mut self) {
        self.index = None;
    }
}

/// Momentopname van de animatie na een frame, klaar voor de renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub phase: AnimationPhase,
    pub roi_index: Option<usize>,
    pub roi_name: Option<String>,
    pub pose: CameraPose,
    pub rig: CameraRig,
    /// Opaciteit van alle meshes behalve de actieve ROI.
    pub background_opacity: f64,
    pub playing: bool,
    pub cycles_completed: u32,
}

#[derive(Debug, Clone)]
struct Region {
    name: String,
    /// Vorm en middelpunt; `None` als het rapport geen mesh voor de ROI heeft.
    framing: Option<([f64; 3], [f64; 3])>,
}

/// Eigenaar van de live camerapose, de fase en de ROI-cursor.
#[derive(Debug, Clone)]
pub struct Animator {
    settings: AnimationSettings,
    volume_shape: [f64; 3],
    volume_center: [f64; 3],
    regions: Vec<Region>,
    cursor: RoiCursor,
    phase: AnimationPhase,
    phase_elapsed: f64,
    live: CameraPose,
    target: CameraPose,
    highlight: MeshHighlight,
    playing: bool,
    cycles_completed: u32,
}

impl Animator {
    #[must_use]
    pub fn new(report: &Report, config: &ViewerConfig) -> Self {
        let volume_shape = report.volume_shape_f64();
        let volume_center = config.volume_center(volume_shape);

        let regions: Vec<Region> = report
            .segments_of_interest
            .iter()
            .map(|name| Region {
                name: name.clone(),
                framing: report
                    .segment(name)
                    .map(|mesh| (mesh.shape.unwrap_or(volume_shape), mesh.geometric_origin)),
            })
            .collect();

        let initial = CameraPose::framing(volume_shape, volume_center, &config.animation)
            .with_yaw(config.animation.initial_yaw);

        let mut animator = Self {
            settings: config.animation,
            volume_shape,
            volume_center,
            cursor: RoiCursor::new(regions.len()),
            regions,
            phase: AnimationPhase::ZoomIn,
            phase_elapsed: 0.0,
            live: initial,
            target: initial,
            highlight: MeshHighlight::new(
                config.animation.faded_opacity,
                config.animation.resolution,
            ),
            playing: true,
            cycles_completed: 0,
        };
        animator.reset();
        animator
    }

    /// Verwerkt één frame van `delta_seconds` en geeft de nieuwe toestand terug.
    pub fn advance(&mut self, delta_seconds: f64) -> Frame {
        let dt = if delta_seconds.is_finite() && delta_seconds > 0.0 {
            delta_seconds
        } else {
            0.0
        };
        let alpha = (self.settings.lerp_rate * dt).clamp(0.0, 1.0);
        let resolution = self.settings.resolution;

        match self.phase {
            AnimationPhase::ZoomIn | AnimationPhase::ZoomOut => {
                self.phase_elapsed += dt;
                self.live.lerp_towards(&self.target, alpha, resolution);
                self.highlight.track(&self.live);

                if self.live.matches(&self.target, resolution) {
                    self.highlight.settle();
                    self.enter(self.phase.next());
                }
            }
            AnimationPhase::Turntable => {
                self.live.lerp_towards(&self.target, alpha, resolution);
                if self.playing {
                    self.phase_elapsed += dt;
                    self.live.rotate(self.settings.angular_speed * dt);
                }

                if self.phase_elapsed >= self.settings.turntable_seconds {
                    self.target = self.full_volume_pose().with_yaw(self.live.yaw);
                    self.highlight.release(&self.live, &self.target);
                    self.enter(AnimationPhase::ZoomOut);
                }
            }
            AnimationPhase::RoiChange => {
                self.cursor.advance();
                if self.cursor.is_full_body() {
                    self.cycles_completed += 1;
                }
                self.retarget();
                self.enter(AnimationPhase::ZoomIn);
            }
        }

        self.frame()
    }

    /// Verplaatst de cursor en start de zoom naar de nieuwe selectie.
    pub fn navigate(&mut self, direction: Direction) -> Frame {
        self.cursor.step(direction);
        self.retarget();
        self.enter(AnimationPhase::ZoomIn);
        self.frame()
    }

    /// Pauzeert of hervat de turntable. Geeft de nieuwe afspeelstatus terug.
    pub fn toggle_playback(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Herstelt de begintoestand: volledig lichaam, alles ondoorzichtig.
    pub fn reset(&mut self) {
        self.cursor.reset();
        self.live = self
            .full_volume_pose()
            .with_yaw(self.settings.initial_yaw);
        self.target = self.live;
        self.highlight.clear();
        self.phase = AnimationPhase::ZoomIn;
        self.phase_elapsed = 0.0;
        self.playing = true;
        self.cycles_completed = 0;
    }

    /// Pose die het volledige volume in beeld brengt.
    #[must_use]
    pub fn full_volume_pose(&self) -> CameraPose {
        CameraPose::framing(self.volume_shape, self.volume_center, &self.settings)
    }

    /// Doelpose voor het inzoomen op een ROI. Zonder mesh-metadata valt deze
    /// terug op het volledige volume.
    #[must_use]
    pub fn region_pose(&self, name: &str) -> CameraPose {
        let framing = self
            .regions
            .iter()
            .find(|region| region.name == name)
            .and_then(|region| region.framing);

        match framing {
            Some((shape, origin)) => CameraPose::framing(shape, origin, &self.settings),
            None => {
                log::warn!("geen mesh-metadata voor ROI `{name}`, volledig volume wordt getoond");
                self.full_volume_pose()
            }
        }
    }

    #[must_use]
    pub fn frame(&self) -> Frame {
        Frame {
            phase: self.phase,
            roi_index: self.cursor.index(),
            roi_name: self.active_region().map(str::to_owned),
            pose: self.live,
            rig: self.live.rig(self.settings.light_distance_ratio),
            background_opacity: self.highlight.background_opacity(),
            playing: self.playing,
            cycles_completed: self.cycles_completed,
        }
    }

    #[must_use]
    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    #[must_use]
    pub fn cursor(&self) -> RoiCursor {
        self.cursor
    }

    #[must_use]
    pub fn live_pose(&self) -> &CameraPose {
        &self.live
    }

    #[must_use]
    pub fn target_pose(&self) -> &CameraPose {
        &self.target
    }

    /// Verstreken tijd in de huidige fase, in seconden.
    #[must_use]
    pub fn phase_elapsed(&self) -> f64 {
        self.phase_elapsed
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[must_use]
    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    #[must_use]
    pub fn active_region(&self) -> Option<&str> {
        self.cursor
            .index()
            .and_then(|index| self.regions.get(index))
            .map(|region| region.name.as_str())
    }

    #[must_use]
    pub fn highlight(&self) -> &MeshHighlight {
        &self.highlight
    }

    #[must_use]
    pub fn opacity_for(&self, mesh_name: &str) -> f64 {
        self.highlight.opacity_for(mesh_name)
    }

    fn retarget(&mut self) {
        let pose = match self.active_region() {
            Some(name) => self.region_pose(name),
            None => self.full_volume_pose(),
        };
        self.target = pose.with_yaw(self.live.yaw);

        let active = self.active_region().map(str::to_owned);
        self.highlight
            .focus(active.as_deref(), &self.live, &self.target);
    }

    fn enter(&mut self, phase: AnimationPhase) {
        log::debug!(
            "fase {} -> {} (roi {:?})",
            self.phase.name(),
            phase.name(),
            self.cursor.index()
        );
        self.phase = phase;
        self.phase_elapsed = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::f64::consts::TAU;

    use super::*;
    use crate::report::{ReportMetadata, SegmentMesh};

    fn report(segments: &[&str], meshes: &[(&str, [f64; 3], Option<[f64; 3]>)]) -> Report {
        Report {
            id: 1,
            media_id: "media".to_owned(),
            volume_shape: [512, 512, 270],
            segments_of_interest: segments.iter().map(|name| (*name).to_owned()).collect(),
            meshes: meshes
                .iter()
                .map(|(name, origin, shape)| SegmentMesh {
                    name: (*name).to_owned(),
                    geometric_origin: *origin,
                    shape: *shape,
                })
                .collect(),
            simplified_reports: BTreeMap::new(),
            metadata: ReportMetadata::default(),
        }
    }

    fn fast_config() -> ViewerConfig {
        let mut config = ViewerConfig::default();
        config.animation.turntable_seconds = 1.0;
        config
    }

    fn run_until(animator: &mut Animator, phase: AnimationPhase, dt: f64) -> usize {
        for frame in 1..=10_000 {
            if animator.advance(dt).phase == phase {
                return frame;
            }
        }
        panic!("fase {phase:?} niet bereikt");
    }

    #[test]
    fn zoom_in_target_for_liver_matches_formula() {
        let report = report(&["liver"], &[("liver", [10.0, 20.0, 30.0], None)]);
        let animator = Animator::new(&report, &ViewerConfig::default());

        let target = animator.region_pose("liver");
        assert_eq!(target.distance, 384.0);
        assert_eq!(target.height, 135.0);
        assert_eq!(target.look_at, [10.0, 20.0, 30.0]);
    }

    #[test]
    fn region_shape_overrides_volume_shape() {
        let report = report(
            &["kidney"],
            &[("kidney", [1.0, 2.0, 3.0], Some([80.0, 60.0, 40.0]))],
        );
        let animator = Animator::new(&report, &ViewerConfig::default());
        let target = animator.region_pose("kidney");
        assert_eq!(target.distance, 45.0);
        assert_eq!(target.height, 20.0);
    }

    #[test]
    fn missing_region_metadata_falls_back_to_full_volume() {
        let report = report(&["pancreas"], &[]);
        let animator = Animator::new(&report, &ViewerConfig::default());
        assert_eq!(animator.region_pose("pancreas"), animator.full_volume_pose());
        assert_eq!(animator.full_volume_pose().look_at, [0.0, 256.0, 0.0]);
    }

    #[test]
    fn starts_on_full_body_zoom_in() {
        let report = report(&["liver"], &[("liver", [10.0, 20.0, 30.0], None)]);
        let animator = Animator::new(&report, &ViewerConfig::default());
        assert_eq!(animator.phase(), AnimationPhase::ZoomIn);
        assert_eq!(animator.cursor().index(), None);
        assert_eq!(animator.opacity_for("spleen"), 1.0);
        assert!(animator.is_playing());
    }

    #[test]
    fn phases_follow_strict_cycle() {
        let report = report(
            &["liver", "spleen"],
            &[
                ("liver", [10.0, 20.0, 30.0], None),
                ("spleen", [-40.0, 120.0, 10.0], Some([100.0, 100.0, 100.0])),
            ],
        );
        let mut animator = Animator::new(&report, &fast_config());

        let mut phases = vec![animator.phase()];
        let mut zoom_in_cursors = vec![animator.cursor().index()];
        for _ in 0..5_000 {
            let frame = animator.advance(0.05);
            if frame.phase != *phases.last().unwrap() {
                if frame.phase == AnimationPhase::ZoomIn {
                    zoom_in_cursors.push(frame.roi_index);
                }
                phases.push(frame.phase);
            }
            if phases.len() > 16 {
                break;
            }
        }

        assert!(phases.len() > 16);
        for pair in phases.windows(2) {
            assert_eq!(pair[0].next(), pair[1], "overgang {pair:?}");
        }
        assert_eq!(
            &zoom_in_cursors[..4],
            &[None, Some(0), Some(1), None]
        );
        assert_eq!(animator.cycles_completed(), 1);
    }

    #[test]
    fn turntable_lasts_configured_duration() {
        let report = report(&[], &[]);
        let mut animator = Animator::new(&report, &fast_config());

        animator.advance(0.1);
        assert_eq!(animator.phase(), AnimationPhase::Turntable);

        let frames = run_until(&mut animator, AnimationPhase::ZoomOut, 0.1);
        assert!((10..=11).contains(&frames), "{frames} frames");
    }

    #[test]
    fn turntable_rotates_yaw_and_keeps_it_wrapped() {
        let report = report(&[], &[]);
        let mut config = fast_config();
        config.animation.angular_speed = 40.0;
        let mut animator = Animator::new(&report, &config);
        animator.advance(0.1);

        for _ in 0..9 {
            let frame = animator.advance(0.1);
            assert!((0.0..TAU).contains(&frame.pose.yaw));
        }
        assert!(animator.live_pose().yaw > 0.0);
    }

    #[test]
    fn pausing_freezes_turntable() {
        let report = report(&[], &[]);
        let mut animator = Animator::new(&report, &fast_config());
        animator.advance(0.1);
        assert!(!animator.toggle_playback());

        let yaw = animator.live_pose().yaw;
        for _ in 0..100 {
            animator.advance(0.1);
        }
        assert_eq!(animator.phase(), AnimationPhase::Turntable);
        assert_eq!(animator.live_pose().yaw, yaw);
        assert_eq!(animator.phase_elapsed(), 0.0);

        assert!(animator.toggle_playback());
        run_until(&mut animator, AnimationPhase::ZoomOut, 0.1);
    }

    #[test]
    fn zoom_in_fades_other_meshes() {
        let report = report(
            &["spleen"],
            &[("spleen", [0.0, 0.0, 0.0], Some([100.0, 100.0, 100.0]))],
        );
        let mut animator = Animator::new(&report, &fast_config());
        animator.navigate(Direction::Next);
        assert_eq!(animator.active_region(), Some("spleen"));

        let mut last = animator.highlight().background_opacity();
        while animator.phase() == AnimationPhase::ZoomIn {
            let frame = animator.advance(1.0 / 60.0);
            assert!(frame.background_opacity <= last + 1e-12);
            last = frame.background_opacity;
        }
        assert!((animator.opacity_for("liver") - 0.2).abs() < 1e-12);
        assert_eq!(animator.opacity_for("spleen"), 1.0);

        run_until(&mut animator, AnimationPhase::RoiChange, 0.1);
        assert_eq!(animator.opacity_for("liver"), 1.0);
    }

    #[test]
    fn fade_follows_look_at_travel_without_region_shape() {
        let report = report(&["liver"], &[("liver", [10.0, 20.0, 30.0], None)]);
        let mut animator = Animator::new(&report, &ViewerConfig::default());
        animator.navigate(Direction::Next);

        let first = animator.advance(1.0 / 60.0);
        assert_eq!(first.phase, AnimationPhase::ZoomIn);
        assert!(
            first.background_opacity > 0.9,
            "opaciteit sprong naar {} in het eerste frame",
            first.background_opacity
        );

        let mut last = first.background_opacity;
        let mut frames = 1;
        while animator.phase() == AnimationPhase::ZoomIn {
            let frame = animator.advance(1.0 / 60.0);
            assert!(frame.background_opacity <= last + 1e-12);
            last = frame.background_opacity;
            frames += 1;
        }
        assert!(frames > 100);
        assert!((animator.opacity_for("spleen") - 0.2).abs() < 1e-12);

        run_until(&mut animator, AnimationPhase::ZoomOut, 0.5);
        let first_out = animator.advance(1.0 / 60.0);
        assert!(first_out.background_opacity < 0.3);
    }

    #[test]
    fn navigation_wraps_through_full_body() {
        let report = report(&["a", "b"], &[]);
        let mut animator = Animator::new(&report, &ViewerConfig::default());

        assert_eq!(animator.navigate(Direction::Previous).roi_index, Some(1));
        assert_eq!(animator.navigate(Direction::Next).roi_index, None);
        assert_eq!(animator.navigate(Direction::Next).roi_index, Some(0));
        assert_eq!(animator.navigate(Direction::Previous).roi_index, None);
    }

    #[test]
    fn navigation_restarts_zoom_in() {
        let report = report(&["liver"], &[("liver", [10.0, 20.0, 30.0], None)]);
        let mut animator = Animator::new(&report, &fast_config());
        run_until(&mut animator, AnimationPhase::Turntable, 0.1);

        let frame = animator.navigate(Direction::Next);
        assert_eq!(frame.phase, AnimationPhase::ZoomIn);
        assert_eq!(frame.roi_name.as_deref(), Some("liver"));
        assert_eq!(animator.target_pose().look_at, [10.0, 20.0, 30.0]);
    }

    #[test]
    fn navigation_without_regions_stays_on_full_body() {
        let report = report(&[], &[]);
        let mut animator = Animator::new(&report, &ViewerConfig::default());
        assert_eq!(animator.navigate(Direction::Next).roi_index, None);
        assert_eq!(animator.navigate(Direction::Previous).roi_index, None);
    }

    #[test]
    fn reset_restores_initial_state() {
        let report = report(&["liver"], &[("liver", [10.0, 20.0, 30.0], None)]);
        let mut animator = Animator::new(&report, &fast_config());
        let initial = *animator.live_pose();

        animator.navigate(Direction::Next);
        for _ in 0..30 {
            animator.advance(0.1);
        }
        animator.toggle_playback();
        animator.reset();

        assert_eq!(*animator.live_pose(), initial);
        assert_eq!(animator.phase(), AnimationPhase::ZoomIn);
        assert_eq!(animator.cursor().index(), None);
        assert_eq!(animator.opacity_for("spleen"), 1.0);
        assert!(animator.is_playing());
    }

    #[test]
    fn invalid_timestep_does_not_move_camera() {
        let report = report(&["liver"], &[("liver", [10.0, 20.0, 30.0], None)]);
        let mut animator = Animator::new(&report, &ViewerConfig::default());
        animator.navigate(Direction::Next);
        let before = *animator.live_pose();

        animator.advance(f64::NAN);
        animator.advance(-1.0);
        animator.advance(f64::INFINITY);

        assert_eq!(*animator.live_pose(), before);
    }

    #[test]
    fn cursor_advance_and_retreat_wrap() {
        let mut cursor = RoiCursor::new(3);
        cursor.advance();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.index(), Some(2));
        cursor.advance();
        assert!(cursor.is_full_body());
        cursor.retreat();
        assert_eq!(cursor.index(), Some(2));
    }
}
