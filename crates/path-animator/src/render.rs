//! Draws timeline frames with plotters: an animated GIF plus a PNG of the last frame.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

use crate::error::RenderError;
use crate::quality::{Quality, QualityPreset};
use crate::scene::{
    COORD_SCALE, DOT_RADIUS, FRAME_HEIGHT, FRAME_WIDTH, PLANE_EXTENT, PathScene, Rgb, ScenePoint,
    TRAIL_OPACITY,
};
use crate::timeline::{FrameState, timeline};

pub const SCENE_NAME: &str = "PathAnimation";
pub const OUTPUT_GROUP: &str = "path_animator";

const CORNER_BUFF: f64 = 0.5;
const GRID_OPACITY: f64 = 0.3;
const LEGEND_SQUARE: f64 = 0.3;
const LEGEND_LABEL_BUFF: f64 = 0.2;
const LEGEND_ROW_BUFF: f64 = 0.1;
const LEGEND_BOX_BUFF: f64 = 0.3;

/// GIF delays are whole centiseconds and many viewers stretch a one-centisecond delay to ten,
/// so faster presets are encoded at this rate instead.
pub const GIF_MAX_FRAME_RATE: u32 = 50;

const TITLE_FONT: f64 = 20.0;
const COUNTER_FONT: f64 = 18.0;
const LEGEND_FONT: f64 = 15.0;
const AXIS_FONT: f64 = 11.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub video: PathBuf,
    pub last_frame: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub paths: OutputPaths,
    pub frames: usize,
}

/// `<media>/videos/path_animator/<quality>/PathAnimation.gif` and
/// `<media>/images/path_animator/PathAnimation.png`.
pub fn output_paths(media_dir: &Path, quality: Quality) -> OutputPaths {
    OutputPaths {
        video: media_dir
            .join("videos")
            .join(OUTPUT_GROUP)
            .join(quality.preset().dir_name())
            .join(format!("{SCENE_NAME}.gif")),
        last_frame: media_dir
            .join("images")
            .join(OUTPUT_GROUP)
            .join(format!("{SCENE_NAME}.png")),
    }
}

/// Maps scene units onto the pixel grid. The origin sits at the frame center, y points up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(preset: QualityPreset) -> Self {
        Self {
            width: preset.pixel_width,
            height: preset.pixel_height,
        }
    }

    fn x_scale(&self) -> f64 {
        self.width as f64 / FRAME_WIDTH
    }

    fn y_scale(&self) -> f64 {
        self.height as f64 / FRAME_HEIGHT
    }

    pub fn to_pixel(&self, p: ScenePoint) -> (i32, i32) {
        (
            ((p.x + FRAME_WIDTH / 2.0) * self.x_scale()).round() as i32,
            ((FRAME_HEIGHT / 2.0 - p.y) * self.y_scale()).round() as i32,
        )
    }

    pub fn span(&self, units: f64) -> i32 {
        (units * self.y_scale()).round() as i32
    }

    /// Stroke widths are given in hundredths of a scene unit.
    pub fn stroke(&self, width: f64) -> u32 {
        (width * self.x_scale() * 0.01).round().max(1.0) as u32
    }

    /// Font sizes are tuned at 480 rows and scale with the output height.
    pub fn font_px(&self, size: f64) -> f64 {
        (size * self.height as f64 / 480.0 * 0.9).round().max(6.0)
    }
}

/// Frame rate the GIF is sampled at, and its per-frame delay in milliseconds rounded to whole
/// centiseconds.
pub fn gif_timing(preset: QualityPreset) -> (u32, u32) {
    let fps = preset.frame_rate.clamp(1, GIF_MAX_FRAME_RATE);
    let centis = (100.0 / fps as f64).round() as u32;
    (fps, centis.max(2) * 10)
}

fn draw_err<E: Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn font<'a>(vp: &Viewport, size: f64) -> FontDesc<'a> {
    FontDesc::new(FontFamily::Monospace, vp.font_px(size), FontStyle::Normal)
}

fn point(x: f64, y: f64) -> ScenePoint {
    ScenePoint { x, y }
}

fn ensure_parent(path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| RenderError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn draw_grid<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    vp: &Viewport,
    progress: f64,
) -> Result<(), RenderError> {
    if progress <= 0.0 {
        return Ok(());
    }
    let half_w = FRAME_WIDTH / 2.0;
    let half_h = FRAME_HEIGHT / 2.0;
    let extent = PLANE_EXTENT as f64 * COORD_SCALE;
    let (x_lo, x_hi) = (-extent.min(half_w), extent.min(half_w));
    let (y_lo, y_hi) = (-extent.min(half_h), extent.min(half_h));

    let thin = WHITE.mix(GRID_OPACITY * progress).stroke_width(1);
    let axis = WHITE.mix(progress).stroke_width(vp.stroke(2.0));
    let label_font = font(vp, AXIS_FONT);

    for k in -PLANE_EXTENT..=PLANE_EXTENT {
        if k == 0 {
            continue;
        }
        let c = k as f64 * COORD_SCALE;
        if c.abs() <= half_w {
            root.draw(&PathElement::new(
                vec![vp.to_pixel(point(c, y_lo)), vp.to_pixel(point(c, y_hi))],
                thin,
            ))
            .map_err(draw_err)?;
            let style = label_font
                .clone()
                .color(&WHITE.mix(progress))
                .pos(Pos::new(HPos::Center, VPos::Top));
            let (x, y) = vp.to_pixel(point(c, 0.0));
            root.draw(&Text::new(k.to_string(), (x, y + 3), style))
                .map_err(draw_err)?;
        }
        if c.abs() <= half_h {
            root.draw(&PathElement::new(
                vec![vp.to_pixel(point(x_lo, c)), vp.to_pixel(point(x_hi, c))],
                thin,
            ))
            .map_err(draw_err)?;
            let style = label_font
                .clone()
                .color(&WHITE.mix(progress))
                .pos(Pos::new(HPos::Right, VPos::Center));
            let (x, y) = vp.to_pixel(point(0.0, c));
            root.draw(&Text::new(k.to_string(), (x - 4, y), style))
                .map_err(draw_err)?;
        }
    }

    root.draw(&PathElement::new(
        vec![vp.to_pixel(point(x_lo, 0.0)), vp.to_pixel(point(x_hi, 0.0))],
        axis,
    ))
    .map_err(draw_err)?;
    root.draw(&PathElement::new(
        vec![vp.to_pixel(point(0.0, y_lo)), vp.to_pixel(point(0.0, y_hi))],
        axis,
    ))
    .map_err(draw_err)?;
    Ok(())
}

/// The title is written on character by character.
fn draw_title<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    vp: &Viewport,
    scene: &PathScene,
    progress: f64,
) -> Result<(), RenderError> {
    if progress <= 0.0 {
        return Ok(());
    }
    let total: usize = scene.title.iter().map(|l| l.chars().count()).sum();
    let mut budget = (progress * total as f64).ceil() as usize;
    let style = font(vp, TITLE_FONT)
        .color(&WHITE)
        .pos(Pos::new(HPos::Left, VPos::Top));
    let line_height = (vp.font_px(TITLE_FONT) * 1.3) as i32;
    let left = vp.span(CORNER_BUFF);
    let mut top = vp.span(CORNER_BUFF);

    for line in &scene.title {
        let shown: String = line.chars().take(budget).collect();
        budget = budget.saturating_sub(line.chars().count());
        if !shown.is_empty() {
            root.draw(&Text::new(shown, (left, top), style.clone()))
                .map_err(draw_err)?;
        }
        top += line_height;
    }
    Ok(())
}

fn draw_counter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    vp: &Viewport,
    counter: &[(String, f64)],
) -> Result<(), RenderError> {
    let left = vp.span(CORNER_BUFF);
    let bottom = vp.height as i32 - vp.span(CORNER_BUFF);
    for (label, opacity) in counter {
        if *opacity <= 0.0 {
            continue;
        }
        let style = font(vp, COUNTER_FONT)
            .color(&WHITE.mix(*opacity))
            .pos(Pos::new(HPos::Left, VPos::Bottom));
        root.draw(&Text::new(label.clone(), (left, bottom), style))
            .map_err(draw_err)?;
    }
    Ok(())
}

/// Boxed legend in the upper-right corner: one colored square and label per trial.
fn draw_legend<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    vp: &Viewport,
    scene: &PathScene,
    opacity: f64,
) -> Result<(), RenderError> {
    if opacity <= 0.0 || scene.tracks.is_empty() {
        return Ok(());
    }
    let square = vp.span(LEGEND_SQUARE).max(4);
    let label_gap = vp.span(LEGEND_LABEL_BUFF);
    let row_gap = vp.span(LEGEND_ROW_BUFF);
    let box_buff = vp.span(LEGEND_BOX_BUFF);
    let corner = vp.span(CORNER_BUFF);

    let measure_style = font(vp, LEGEND_FONT).color(&WHITE);
    let mut label_width = 0i32;
    let mut row_height = square;
    for track in &scene.tracks {
        let (w, h) = root
            .estimate_text_size(&track.legend_label, &measure_style)
            .map_err(draw_err)?;
        label_width = label_width.max(w as i32);
        row_height = row_height.max(h as i32);
    }

    let rows = scene.tracks.len() as i32;
    let content_w = square + label_gap + label_width;
    let content_h = rows * row_height + (rows - 1) * row_gap;
    let box_right = vp.width as i32 - corner;
    let box_left = box_right - content_w - 2 * box_buff;
    let box_top = corner;
    let box_bottom = box_top + content_h + 2 * box_buff;

    root.draw(&Rectangle::new(
        [(box_left, box_top), (box_right, box_bottom)],
        WHITE.mix(opacity).stroke_width(vp.stroke(4.0)),
    ))
    .map_err(draw_err)?;

    let label_style = font(vp, LEGEND_FONT)
        .color(&WHITE.mix(opacity))
        .pos(Pos::new(HPos::Left, VPos::Center));
    for (row, track) in scene.tracks.iter().enumerate() {
        let row_top = box_top + box_buff + row as i32 * (row_height + row_gap);
        let center_y = row_top + row_height / 2;
        let sq_left = box_left + box_buff;
        root.draw(&Rectangle::new(
            [
                (sq_left, center_y - square / 2),
                (sq_left + square, center_y + square / 2),
            ],
            rgb(track.color).mix(opacity).filled(),
        ))
        .map_err(draw_err)?;
        root.draw(&Text::new(
            track.legend_label.clone(),
            (sq_left + square + label_gap, center_y),
            label_style.clone(),
        ))
        .map_err(draw_err)?;
    }
    Ok(())
}

fn draw_tracks<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    vp: &Viewport,
    scene: &PathScene,
    frame: &FrameState,
) -> Result<(), RenderError> {
    for track in &scene.tracks {
        let color = rgb(track.color);
        let style = color
            .mix(TRAIL_OPACITY)
            .stroke_width(vp.stroke(track.stroke_width));
        for seg in &frame.trails[track.index] {
            root.draw(&PathElement::new(
                vec![vp.to_pixel(seg.from), vp.to_pixel(seg.to)],
                style,
            ))
            .map_err(draw_err)?;
        }
    }
    // Dots go on top of every trail.
    for track in &scene.tracks {
        if let Some(dot) = frame.dots[track.index] {
            root.draw(&Circle::new(
                vp.to_pixel(dot),
                vp.span(DOT_RADIUS).max(2),
                rgb(track.color).filled(),
            ))
            .map_err(draw_err)?;
        }
    }
    Ok(())
}

pub fn draw_frame<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    vp: &Viewport,
    scene: &PathScene,
    frame: &FrameState,
) -> Result<(), RenderError> {
    root.fill(&BLACK).map_err(draw_err)?;
    draw_grid(root, vp, frame.grid)?;
    draw_title(root, vp, scene, frame.title)?;
    draw_legend(root, vp, scene, frame.legend)?;
    draw_counter(root, vp, &frame.counter)?;
    draw_tracks(root, vp, scene, frame)?;
    Ok(())
}

/// Renders the whole scene. Existing outputs at the same paths are overwritten.
pub fn render(
    scene: &PathScene,
    quality: Quality,
    media_dir: &Path,
) -> Result<RenderOutput, RenderError> {
    let preset = quality.preset();
    let paths = output_paths(media_dir, quality);
    ensure_parent(&paths.video)?;
    ensure_parent(&paths.last_frame)?;

    let vp = Viewport::new(preset);
    let size = (preset.pixel_width, preset.pixel_height);
    let (fps, frame_delay_ms) = gif_timing(preset);
    let frames = timeline(scene, fps);

    {
        let root = BitMapBackend::gif(&paths.video, size, frame_delay_ms)
            .map_err(draw_err)?
            .into_drawing_area();
        for frame in &frames {
            draw_frame(&root, &vp, scene, frame)?;
            root.present().map_err(draw_err)?;
        }
    }

    if let Some(last) = frames.last() {
        let root = BitMapBackend::new(&paths.last_frame, size).into_drawing_area();
        draw_frame(&root, &vp, scene, last)?;
        root.present().map_err(draw_err)?;
    }

    Ok(RenderOutput {
        paths,
        frames: frames.len(),
    })
}
