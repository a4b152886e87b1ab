//! Scene choreography for one (model, temperature) pair.
//!
//! A [`PathScene`] is plain data: the tracks to draw and the ordered animations to play. It
//! holds no drawing state, so the same scene always renders the same frames.

use walk_core::document::Position;
use walk_core::WalkDocument;

use crate::error::AnimateError;

/// Walk coordinates are halved into scene units, so one walk step is one grid cell.
pub const COORD_SCALE: f64 = 0.5;
/// The grid spans `-PLANE_EXTENT..=PLANE_EXTENT` walk units on both axes.
pub const PLANE_EXTENT: i64 = 20;
pub const FRAME_HEIGHT: f64 = 8.0;
pub const FRAME_WIDTH: f64 = FRAME_HEIGHT * 16.0 / 9.0;

pub const DOT_RADIUS: f64 = 0.08;
pub const TRAIL_OPACITY: f64 = 0.7;

pub const STEP_RUN_TIME: f64 = 0.8;
pub const STEP_HOLD: f64 = 0.1;
pub const FINAL_HOLD: f64 = 4.0;
const DEFAULT_RUN_TIME: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Trial colors, cycled by trial index.
pub const PALETTE: [Rgb; 5] = [
    Rgb(0xFF, 0x00, 0x00),
    Rgb(0x00, 0x00, 0xFF),
    Rgb(0x00, 0xFF, 0x00),
    Rgb(0xFF, 0xFF, 0x00),
    Rgb(0xD1, 0x47, 0xBD),
];

pub fn trial_color(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePoint {
    pub x: f64,
    pub y: f64,
}

impl ScenePoint {
    pub fn from_position(p: Position) -> Self {
        Self {
            x: p.x as f64 * COORD_SCALE,
            y: p.y as f64 * COORD_SCALE,
        }
    }

    pub fn lerp(self, to: ScenePoint, t: f64) -> Self {
        Self {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

/// One trial's dot and trail.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialTrack {
    pub index: usize,
    pub color: Rgb,
    pub stroke_width: f64,
    pub legend_label: String,
    pub points: Vec<ScenePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialMove {
    pub trial: usize,
    pub from: ScenePoint,
    pub to: ScenePoint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnimationKind {
    CreateGrid,
    WriteTitle,
    FadeInLegend,
    WriteStepCounter,
    /// Places every dot and an empty trail at the trial's first point. Instantaneous.
    AddTrials,
    /// Every listed trial advances one position while the counter swaps to `label`.
    Step {
        step: usize,
        moves: Vec<TrialMove>,
        label: String,
    },
    Wait,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub kind: AnimationKind,
    pub run_time: f64,
}

impl Animation {
    fn new(kind: AnimationKind, run_time: f64) -> Self {
        Self { kind, run_time }
    }

    fn wait(run_time: f64) -> Self {
        Self::new(AnimationKind::Wait, run_time)
    }
}

pub fn step_label(step_number: usize) -> String {
    format!("Step {step_number}")
}

/// Parses a CLI temperature and rounds it to one decimal, the precision the document keys use.
///
/// Rounding works on the exact binary value with ties to even, so `0.25` becomes `0.2` and
/// `0.35` (stored just below the tie) becomes `0.3`.
pub fn parse_temperature(raw: &str) -> Result<f64, AnimateError> {
    let invalid = || AnimateError::InvalidTemperature(raw.to_string());
    let t: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !t.is_finite() {
        return Err(invalid());
    }
    format!("{t:.1}").parse().map_err(|_| invalid())
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathScene {
    pub model: String,
    pub temperature: f64,
    pub title: [String; 2],
    pub tracks: Vec<TrialTrack>,
    pub animations: Vec<Animation>,
}

impl PathScene {
    /// Looks up trials `0..rounds` for the pair and lays out the scene.
    pub fn construct(
        doc: &WalkDocument,
        model: &str,
        temperature: f64,
        rounds: usize,
    ) -> Result<Self, AnimateError> {
        let paths = doc.paths(model, temperature, rounds)?;
        Self::from_paths(model, temperature, paths)
    }

    pub fn from_paths(
        model: &str,
        temperature: f64,
        paths: Vec<Vec<Position>>,
    ) -> Result<Self, AnimateError> {
        if paths.is_empty() {
            return Err(AnimateError::NoTrials);
        }
        if let Some(i) = paths.iter().position(Vec::is_empty) {
            return Err(AnimateError::EmptyPath(i));
        }

        let tracks: Vec<TrialTrack> = paths
            .into_iter()
            .enumerate()
            .map(|(i, path)| TrialTrack {
                index: i,
                color: trial_color(i),
                stroke_width: 3.0 + i as f64 * 0.5,
                legend_label: format!("Round {}", i + 1),
                points: path.into_iter().map(ScenePoint::from_position).collect(),
            })
            .collect();

        let mut animations = vec![
            Animation::new(AnimationKind::CreateGrid, DEFAULT_RUN_TIME),
            Animation::new(AnimationKind::WriteTitle, DEFAULT_RUN_TIME),
            Animation::wait(0.2),
            Animation::new(AnimationKind::FadeInLegend, DEFAULT_RUN_TIME),
            Animation::wait(1.0),
            Animation::new(AnimationKind::WriteStepCounter, DEFAULT_RUN_TIME),
            Animation::wait(0.2),
            Animation::new(AnimationKind::AddTrials, 0.0),
        ];

        // Trials are equal length for a completed run; the shortest bounds the steps if not.
        let shortest = tracks.iter().map(|t| t.points.len()).min().unwrap_or(0);
        for step in 0..shortest.saturating_sub(1) {
            let moves = tracks
                .iter()
                .filter(|t| step + 1 < t.points.len())
                .map(|t| TrialMove {
                    trial: t.index,
                    from: t.points[step],
                    to: t.points[step + 1],
                })
                .collect();
            animations.push(Animation::new(
                AnimationKind::Step {
                    step,
                    moves,
                    label: step_label(step + 2),
                },
                STEP_RUN_TIME,
            ));
            animations.push(Animation::wait(STEP_HOLD));
        }
        animations.push(Animation::wait(FINAL_HOLD));

        Ok(Self {
            model: model.to_string(),
            temperature,
            title: [
                format!("Model: {model}"),
                format!("Temperature: {temperature:?}"),
            ],
            tracks,
            animations,
        })
    }

    pub fn transitions(&self) -> impl Iterator<Item = (usize, &[TrialMove])> + '_ {
        self.animations.iter().filter_map(|a| match &a.kind {
            AnimationKind::Step { step, moves, .. } => Some((*step, moves.as_slice())),
            _ => None,
        })
    }

    pub fn duration(&self) -> f64 {
        self.animations.iter().map(|a| a.run_time).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walk_core::document::{ModelRun, TemperatureBucket, TrialRecord};

    fn positions(points: &[[i64; 2]]) -> Vec<Position> {
        points.iter().copied().map(Position::from).collect()
    }

    fn three_step_document() -> WalkDocument {
        let mut bucket = TemperatureBucket::new(0.5);
        bucket.trials.push(TrialRecord {
            decisions: vec!["RIGHT".into(), "UP".into(), "LEFT".into()],
            positions: positions(&[[0, 0], [1, 0], [1, 1]]),
        });
        let mut run = ModelRun::new("m:v");
        run.buckets.push(bucket);
        let mut doc = WalkDocument::new();
        doc.insert(run);
        doc
    }

    #[test]
    fn single_trial_document_gives_one_track_and_two_transitions() -> anyhow::Result<()> {
        let scene = PathScene::construct(&three_step_document(), "m:v", 0.5, 1)?;

        assert_eq!(scene.tracks.len(), 1);
        let transitions: Vec<_> = scene.transitions().collect();
        assert_eq!(transitions.len(), 2);
        assert!(transitions.iter().all(|(_, moves)| moves.len() == 1));

        let (_, last) = transitions[1];
        assert_eq!(last[0].from, ScenePoint { x: 0.5, y: 0.0 });
        assert_eq!(last[0].to, ScenePoint { x: 0.5, y: 0.5 });
        assert_eq!(scene.title, ["Model: m:v".to_string(), "Temperature: 0.5".to_string()]);
        Ok(())
    }

    #[test]
    fn step_labels_advance_from_step_two() -> anyhow::Result<()> {
        let scene = PathScene::construct(&three_step_document(), "m:v", 0.5, 1)?;
        let labels: Vec<&str> = scene
            .animations
            .iter()
            .filter_map(|a| match &a.kind {
                AnimationKind::Step { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["Step 2", "Step 3"]);
        Ok(())
    }

    #[test]
    fn colors_cycle_through_the_palette() -> anyhow::Result<()> {
        let paths = (0..7).map(|_| positions(&[[0, 0]])).collect();
        let scene = PathScene::from_paths("m:v", 0.0, paths)?;
        assert_eq!(scene.tracks[5].color, scene.tracks[0].color);
        assert_eq!(scene.tracks[6].color, PALETTE[1]);
        assert_eq!(scene.tracks[6].legend_label, "Round 7");
        assert_eq!(scene.tracks[2].stroke_width, 4.0);
        Ok(())
    }

    #[test]
    fn shortest_trajectory_bounds_the_steps() -> anyhow::Result<()> {
        let scene = PathScene::from_paths(
            "m:v",
            0.2,
            vec![
                positions(&[[0, 0], [1, 0], [2, 0], [3, 0]]),
                positions(&[[0, 0], [0, 1]]),
            ],
        )?;
        let transitions: Vec<_> = scene.transitions().collect();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].1.len(), 2);
        Ok(())
    }

    #[test]
    fn timing_adds_up() -> anyhow::Result<()> {
        let scene = PathScene::construct(&three_step_document(), "m:v", 0.5, 1)?;
        let intro = 1.0 + 1.0 + 0.2 + 1.0 + 1.0 + 1.0 + 0.2;
        let expected = intro + 2.0 * (STEP_RUN_TIME + STEP_HOLD) + FINAL_HOLD;
        assert!((scene.duration() - expected).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn degenerate_inputs_are_errors() {
        assert!(matches!(
            PathScene::from_paths("m:v", 0.5, vec![]),
            Err(AnimateError::NoTrials)
        ));
        assert!(matches!(
            PathScene::from_paths("m:v", 0.5, vec![positions(&[[0, 0]]), vec![]]),
            Err(AnimateError::EmptyPath(1))
        ));
        assert!(matches!(
            PathScene::construct(&three_step_document(), "m:v", 0.5, 2),
            Err(AnimateError::Document(_))
        ));
    }

    #[test]
    fn temperatures_round_to_one_decimal() -> anyhow::Result<()> {
        assert_eq!(parse_temperature("0.5")?, 0.5);
        assert_eq!(parse_temperature("0.44")?, 0.4);
        assert_eq!(parse_temperature("1")?, 1.0);
        assert_eq!(parse_temperature(" 0.26 ")?, 0.3);
        for (raw, rounded) in [
            ("0.05", 0.1),
            ("0.15", 0.1),
            ("0.25", 0.2),
            ("0.35", 0.3),
            ("0.45", 0.5),
            ("0.85", 0.8),
            ("0.95", 0.9),
        ] {
            assert_eq!(parse_temperature(raw)?, rounded, "{raw}");
        }
        assert!(parse_temperature("warm").is_err());
        assert!(parse_temperature("NaN").is_err());
        Ok(())
    }
}
