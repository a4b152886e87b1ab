//! Expands a [`PathScene`] into one [`FrameState`] per output frame.

use crate::scene::{AnimationKind, PathScene, ScenePoint, step_label};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: ScenePoint,
    pub to: ScenePoint,
}

/// Everything needed to draw one frame. Progress values run from 0 (hidden) to 1 (complete).
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub grid: f64,
    pub title: f64,
    pub legend: f64,
    /// Step counter labels with their opacity; two entries while one replaces the other.
    pub counter: Vec<(String, f64)>,
    /// Per-trial trail segments, the last possibly still growing.
    pub trails: Vec<Vec<Segment>>,
    /// Per-trial dot position; `None` until the trials are added.
    pub dots: Vec<Option<ScenePoint>>,
}

impl FrameState {
    fn empty(trials: usize) -> Self {
        Self {
            grid: 0.0,
            title: 0.0,
            legend: 0.0,
            counter: Vec::new(),
            trails: vec![Vec::new(); trials],
            dots: vec![None; trials],
        }
    }
}

/// Smoothstep easing applied to every animation.
pub fn smooth(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn frames_for(run_time: f64, fps: u32) -> usize {
    ((run_time * fps as f64).round() as usize).max(1)
}

/// Applies an animation at eased progress `e` on top of the state it started from.
fn apply(base: &FrameState, kind: &AnimationKind, e: f64, scene: &PathScene) -> FrameState {
    let mut frame = base.clone();
    match kind {
        AnimationKind::CreateGrid => frame.grid = e,
        AnimationKind::WriteTitle => frame.title = e,
        AnimationKind::FadeInLegend => frame.legend = e,
        AnimationKind::WriteStepCounter => frame.counter = vec![(step_label(1), e)],
        AnimationKind::AddTrials => {
            for track in &scene.tracks {
                frame.dots[track.index] = track.points.first().copied();
            }
        }
        AnimationKind::Step { moves, label, .. } => {
            for m in moves {
                let head = m.from.lerp(m.to, e);
                frame.dots[m.trial] = Some(head);
                frame.trails[m.trial].push(Segment {
                    from: m.from,
                    to: head,
                });
            }
            let mut counter: Vec<(String, f64)> = base
                .counter
                .iter()
                .map(|(l, o)| (l.clone(), o * (1.0 - e)))
                .filter(|(_, o)| *o > 0.0)
                .collect();
            counter.push((label.clone(), e));
            frame.counter = counter;
        }
        AnimationKind::Wait => {}
    }
    frame
}

/// Every frame of the scene at `fps`. Instantaneous animations produce no frame of their own.
pub fn timeline(scene: &PathScene, fps: u32) -> Vec<FrameState> {
    let mut frames = Vec::new();
    let mut state = FrameState::empty(scene.tracks.len());

    for anim in &scene.animations {
        if anim.run_time <= 0.0 {
            state = apply(&state, &anim.kind, 1.0, scene);
            continue;
        }
        let n = frames_for(anim.run_time, fps);
        for k in 1..=n {
            let e = smooth(k as f64 / n as f64);
            frames.push(apply(&state, &anim.kind, e, scene));
        }
        state = apply(&state, &anim.kind, 1.0, scene);
    }

    frames
}

#[cfg(test)]
mod tests {
    use walk_core::document::Position;

    use super::*;

    fn scene() -> PathScene {
        let path = [[0, 0], [1, 0], [1, 1]]
            .into_iter()
            .map(Position::from)
            .collect();
        PathScene::from_paths("m:v", 0.5, vec![path]).unwrap()
    }

    #[test]
    fn easing_hits_both_ends() {
        assert_eq!(smooth(0.0), 0.0);
        assert_eq!(smooth(1.0), 1.0);
        assert_eq!(smooth(0.5), 0.5);
        assert!(smooth(0.25) < 0.25);
    }

    #[test]
    fn frame_count_follows_run_time() {
        let s = scene();
        let fps = 10;
        let expected: usize = s
            .animations
            .iter()
            .filter(|a| a.run_time > 0.0)
            .map(|a| frames_for(a.run_time, fps))
            .sum();
        assert_eq!(timeline(&s, fps).len(), expected);
        assert_eq!(frames_for(0.01, 15), 1);
        assert_eq!(frames_for(0.8, 15), 12);
    }

    #[test]
    fn final_frame_shows_the_whole_walk() {
        let frames = timeline(&scene(), 15);
        let last = frames.last().unwrap();

        assert_eq!((last.grid, last.title, last.legend), (1.0, 1.0, 1.0));
        assert_eq!(last.counter, vec![("Step 3".to_string(), 1.0)]);
        assert_eq!(last.dots, vec![Some(ScenePoint { x: 0.5, y: 0.5 })]);
        assert_eq!(
            last.trails[0],
            vec![
                Segment {
                    from: ScenePoint { x: 0.0, y: 0.0 },
                    to: ScenePoint { x: 0.5, y: 0.0 }
                },
                Segment {
                    from: ScenePoint { x: 0.5, y: 0.0 },
                    to: ScenePoint { x: 0.5, y: 0.5 }
                },
            ]
        );
    }

    #[test]
    fn dots_appear_only_after_the_intro() {
        let frames = timeline(&scene(), 15);
        assert!(frames[0].dots.iter().all(Option::is_none));
        assert!(frames[0].grid > 0.0 && frames[0].title == 0.0);
    }

    #[test]
    fn counter_crossfades_during_a_step() {
        let s = scene();
        let mut base = FrameState::empty(1);
        base.counter = vec![(step_label(1), 1.0)];
        base.dots = vec![Some(ScenePoint { x: 0.0, y: 0.0 })];
        let step = s
            .animations
            .iter()
            .find(|a| matches!(a.kind, AnimationKind::Step { .. }))
            .unwrap();

        let mid = apply(&base, &step.kind, 0.5, &s);
        assert_eq!(
            mid.counter,
            vec![("Step 1".to_string(), 0.5), ("Step 2".to_string(), 0.5)]
        );
        assert_eq!(mid.dots[0], Some(ScenePoint { x: 0.25, y: 0.0 }));
        assert_eq!(mid.trails[0].len(), 1);
    }
}
