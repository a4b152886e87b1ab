//! Builds scenes from documents on disk, the way the CLI does.

use path_animator::render::{gif_timing, output_paths, render};
use path_animator::scene::{AnimationKind, ScenePoint};
use path_animator::timeline::timeline;
use path_animator::{AnimateError, Quality, load_scene};
use walk_core::document::{ModelRun, TemperatureBucket, TrialRecord, data_file_path};
use walk_core::{Position, WalkDocument};

fn write_document(dir: &std::path::Path) -> anyhow::Result<()> {
    let mut run = ModelRun::new("m:v");
    for t in [0.0, 0.5] {
        let mut bucket = TemperatureBucket::new(t);
        bucket.trials.push(TrialRecord {
            decisions: vec!["RIGHT".into(), "UP".into(), "LEFT".into()],
            positions: vec![Position::new(0, 0), Position::new(1, 0), Position::new(1, 1)],
        });
        bucket.trials.push(TrialRecord {
            decisions: vec!["DOWN".into(), "STOP".into(), "LEFT".into()],
            positions: vec![Position::new(0, 0), Position::new(0, -1), Position::new(0, -1)],
        });
        run.buckets.push(bucket);
    }
    let mut doc = WalkDocument::new();
    doc.insert(run);
    doc.save(&data_file_path(dir, "m:v")?)?;
    Ok(())
}

#[test]
fn one_round_gives_one_track_and_two_transitions() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_document(dir.path())?;

    let scene = load_scene(dir.path(), "m:v", "0.5", 1)?;
    assert_eq!(scene.tracks.len(), 1);
    assert_eq!(scene.transitions().count(), 2);

    let last = timeline(&scene, 15).pop().unwrap();
    assert_eq!(last.dots, vec![Some(ScenePoint { x: 0.5, y: 0.5 })]);
    Ok(())
}

#[test]
fn cli_temperature_is_rounded_before_lookup() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_document(dir.path())?;

    let scene = load_scene(dir.path(), "m:v", "0.04", 2)?;
    assert_eq!(scene.temperature, 0.0);
    assert_eq!(scene.title[1], "Temperature: 0.0");
    assert_eq!(scene.tracks.len(), 2);

    let first_step = scene
        .animations
        .iter()
        .find_map(|a| match &a.kind {
            AnimationKind::Step { moves, .. } => Some(moves.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(first_step.len(), 2);
    assert_eq!(first_step[1].to, ScenePoint { x: 0.0, y: -0.5 });
    Ok(())
}

#[test]
fn missing_inputs_are_reported_not_panicked() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    assert!(matches!(
        load_scene(dir.path(), "m:v", "0.5", 1),
        Err(AnimateError::Document(_))
    ));

    write_document(dir.path())?;
    assert!(matches!(
        load_scene(dir.path(), "other:model", "0.5", 1),
        Err(AnimateError::Document(_))
    ));
    assert!(matches!(
        load_scene(dir.path(), "m:v", "0.9", 1),
        Err(AnimateError::Document(_))
    ));
    assert!(matches!(
        load_scene(dir.path(), "m:v", "0.5", 3),
        Err(AnimateError::Document(_))
    ));
    assert!(matches!(
        load_scene(dir.path(), "m:v", "0.5", 0),
        Err(AnimateError::NoTrials)
    ));
    assert!(matches!(
        load_scene(dir.path(), "mv", "0.5", 1),
        Err(AnimateError::ModelId(_))
    ));
    assert!(matches!(
        load_scene(dir.path(), "m:v", "hot", 1),
        Err(AnimateError::InvalidTemperature(_))
    ));
    Ok(())
}

#[test]
fn renders_gif_and_last_frame_into_the_media_layout() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    write_document(dir.path())?;
    let scene = load_scene(dir.path(), "m:v", "0.5", 2)?;

    let media = dir.path().join("media");
    let out = render(&scene, Quality::Low, &media)?;

    assert_eq!(out.paths, output_paths(&media, Quality::Low));
    let (fps, _) = gif_timing(Quality::Low.preset());
    assert_eq!(out.frames, timeline(&scene, fps).len());
    assert!(out.frames > 0);
    for path in [&out.paths.video, &out.paths.last_frame] {
        assert!(std::fs::metadata(path)?.len() > 0, "{}", path.display());
    }
    assert!(out.paths.video.ends_with("videos/path_animator/480p15/PathAnimation.gif"));
    Ok(())
}
