//! Platform-agnostic render commands for the two animations.
//!
//! Each frame is a pure function of the data and a frame index, so the same
//! run can be rasterized by any backend (or serialized and replayed later).

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::domains::bloch::Trajectory;
use crate::domains::monte_carlo::Sample;
use crate::error::{SimError, SimResult};

/// RGBA color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha; 255 is opaque.
    pub a: u8,
}

impl Color {
    /// Create new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Canvas background.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Unit circle, axes and titles.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Bloch trajectory.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Population (`s3`) arrow.
    pub const GREEN: Self = Self::rgb(0, 128, 0);
    /// Scatter samples and the sphere wireframe.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Bloch vector arrow.
    pub const ORANGE: Self = Self::rgb(255, 165, 0);
}

/// Orthographic 3D view: camera angles plus axis bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct View3 {
    /// Elevation above the s1-s2 plane, degrees.
    pub elevation: f64,
    /// Rotation about the s3 axis, degrees.
    pub azimuth: f64,
    /// `(min, max)` per axis.
    pub bounds: [(f64, f64); 3],
}

impl Default for View3 {
    fn default() -> Self {
        Self {
            elevation: 30.0,
            azimuth: 45.0,
            bounds: [(-1.0, 1.0); 3],
        }
    }
}

/// Platform-agnostic render command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Clear the canvas.
    Clear { color: Color },

    /// Set 2D axis limits.
    SetView2 { x: (f64, f64), y: (f64, f64) },

    /// Set the 3D camera.
    SetView3 { view: View3 },

    /// Draw a circle outline or disk.
    DrawCircle {
        x: f64,
        y: f64,
        radius: f64,
        color: Color,
        filled: bool,
    },

    /// Scatter of 2D points.
    DrawPoints {
        points: Vec<(f64, f64)>,
        size: f64,
        color: Color,
    },

    /// Polyline in 3D.
    DrawPath3 {
        points: Vec<[f64; 3]>,
        color: Color,
        width: f64,
    },

    /// Arrow from `origin` to `tip` in 3D.
    DrawArrow3 {
        origin: [f64; 3],
        tip: [f64; 3],
        color: Color,
        width: f64,
    },

    /// Frame title.
    DrawTitle { text: String, color: Color },
}

/// One rendered animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    /// 0-based frame index.
    pub index: usize,
    /// Commands in draw order.
    pub commands: Vec<RenderCommand>,
}

impl RenderFrame {
    fn new(index: usize) -> Self {
        Self {
            index,
            commands: Vec::new(),
        }
    }

    fn push(&mut self, cmd: RenderCommand) {
        self.commands.push(cmd);
    }
}

const SCATTER_SIZE: f64 = 0.001;
const SPHERE_RESOLUTION: usize = 30;
const WIREFRAME_WIDTH: f64 = 0.25;
const ARROW_WIDTH: f64 = 3.0;

/// Number of samples visible in `frame` out of `frame_count`.
///
/// Grows monotonically; the last frame shows everything.
#[must_use]
pub fn visible_samples(len: usize, frame: usize, frame_count: usize) -> usize {
    if frame_count == 0 {
        return 0;
    }
    // u128 keeps (frame + 1) * len exact for any realistic sample count.
    let shown = (frame as u128 + 1) * len as u128 / frame_count as u128;
    usize::try_from(shown).unwrap_or(len).min(len)
}

/// Render frame `frame` of the π scatter animation.
///
/// # Errors
///
/// Returns `InvalidArgument` if `samples` is empty, `frame_count` is zero
/// or `frame >= frame_count`.
pub fn render_pi_frame(
    samples: &[Sample],
    frame: usize,
    frame_count: usize,
) -> SimResult<RenderFrame> {
    if samples.is_empty() {
        return Err(SimError::invalid_argument("samples", "nothing to render"));
    }
    check_frame(frame, frame_count)?;

    let shown = &samples[..visible_samples(samples.len(), frame, frame_count)];
    let title = shown
        .last()
        .map_or_else(|| "π = n/a".to_string(), |s| format!("π = {:.4}", s.estimate));

    let mut out = RenderFrame::new(frame);
    out.push(RenderCommand::Clear {
        color: Color::WHITE,
    });
    out.push(RenderCommand::SetView2 {
        x: (-1.0, 1.0),
        y: (-1.0, 1.0),
    });
    out.push(RenderCommand::DrawCircle {
        x: 0.0,
        y: 0.0,
        radius: 1.0,
        color: Color::BLACK,
        filled: false,
    });
    out.push(RenderCommand::DrawPoints {
        points: shown.iter().map(|s| (s.x, s.y)).collect(),
        size: SCATTER_SIZE,
        color: Color::BLUE,
    });
    out.push(RenderCommand::DrawTitle {
        text: title,
        color: Color::BLACK,
    });
    Ok(out)
}

/// Render every frame of the π animation.
///
/// # Errors
///
/// Same conditions as [`render_pi_frame`].
pub fn render_pi_animation(samples: &[Sample], frame_count: usize) -> SimResult<Vec<RenderFrame>> {
    (0..frame_count.max(1))
        .map(|k| render_pi_frame(samples, k, frame_count))
        .collect()
}

/// Render frame `frame` of the Bloch sphere animation.
///
/// Static scenery (sphere, axes, trajectory) is repeated in every frame so
/// each frame stands alone.
///
/// # Errors
///
/// Returns `InvalidArgument` if `frame` is not a sample index of the
/// trajectory.
pub fn render_bloch_frame(trajectory: &Trajectory, frame: usize) -> SimResult<RenderFrame> {
    let Some((_, s)) = trajectory.get(frame) else {
        return Err(SimError::invalid_argument(
            "frame",
            format!("index {frame} out of range for {} samples", trajectory.len()),
        ));
    };

    let mut out = RenderFrame::new(frame);
    out.push(RenderCommand::Clear {
        color: Color::WHITE,
    });
    out.push(RenderCommand::SetView3 {
        view: View3::default(),
    });

    for path in sphere_wireframe(SPHERE_RESOLUTION) {
        out.push(RenderCommand::DrawPath3 {
            points: path,
            color: Color::BLUE,
            width: WIREFRAME_WIDTH,
        });
    }

    for axis in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
        out.push(RenderCommand::DrawPath3 {
            points: vec![[0.0; 3], axis],
            color: Color::BLACK,
            width: 1.0,
        });
    }

    out.push(RenderCommand::DrawPath3 {
        points: trajectory.states().iter().map(|v| v.to_array()).collect(),
        color: Color::RED,
        width: 1.0,
    });
    out.push(RenderCommand::DrawArrow3 {
        origin: [0.0; 3],
        tip: s.to_array(),
        color: Color::ORANGE,
        width: ARROW_WIDTH,
    });
    out.push(RenderCommand::DrawArrow3 {
        origin: [0.0; 3],
        tip: [0.0, 0.0, s.s3],
        color: Color::GREEN,
        width: ARROW_WIDTH,
    });
    Ok(out)
}

/// Render one frame per trajectory sample.
///
/// # Errors
///
/// Returns `InvalidArgument` for an empty trajectory.
pub fn render_bloch_animation(trajectory: &Trajectory) -> SimResult<Vec<RenderFrame>> {
    if trajectory.is_empty() {
        return Err(SimError::invalid_argument("trajectory", "nothing to render"));
    }
    (0..trajectory.len())
        .map(|k| render_bloch_frame(trajectory, k))
        .collect()
}

/// Unit-sphere wireframe on a `resolution × resolution` grid.
///
/// Returns `2 * resolution` polylines: one per azimuth `u ∈ [0, 2π]` (a
/// meridian) and one per polar angle `v ∈ [0, π]` (a parallel).
#[must_use]
pub fn sphere_wireframe(resolution: usize) -> Vec<Vec<[f64; 3]>> {
    let n = resolution.max(2);
    let step = |span: f64, i: usize| span * i as f64 / (n - 1) as f64;
    let point = |u: f64, v: f64| [u.cos() * v.sin(), u.sin() * v.sin(), v.cos()];

    let meridians = (0..n).map(|i| {
        let u = step(TAU, i);
        (0..n).map(|j| point(u, step(PI, j))).collect()
    });
    let parallels = (0..n).map(|j| {
        let v = step(PI, j);
        (0..n).map(|i| point(step(TAU, i), v)).collect()
    });
    meridians.chain(parallels).collect()
}

fn check_frame(frame: usize, frame_count: usize) -> SimResult<()> {
    if frame_count == 0 {
        return Err(SimError::invalid_argument("frame_count", "must be positive"));
    }
    if frame >= frame_count {
        return Err(SimError::invalid_argument(
            "frame",
            format!("index {frame} out of range for {frame_count} frames"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::bloch::{integrate_obe, BlochVector, SimulationParameters};
    use crate::domains::monte_carlo::estimate_pi;
    use crate::domains::ode::SolverConfig;
    use crate::engine::rng::SimRng;

    fn samples(n: u64) -> Vec<Sample> {
        estimate_pi(n, &mut SimRng::new(7)).unwrap()
    }

    fn trajectory() -> Trajectory {
        integrate_obe(
            BlochVector::EXCITED,
            &SimulationParameters::default(),
            10.0,
            20,
            &SolverConfig::default(),
        )
        .unwrap()
    }

    fn points_of(frame: &RenderFrame) -> usize {
        frame
            .commands
            .iter()
            .find_map(|c| match c {
                RenderCommand::DrawPoints { points, .. } => Some(points.len()),
                _ => None,
            })
            .unwrap()
    }

    fn title_of(frame: &RenderFrame) -> &str {
        frame
            .commands
            .iter()
            .find_map(|c| match c {
                RenderCommand::DrawTitle { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_visible_samples() {
        assert_eq!(visible_samples(1000, 0, 50), 20);
        assert_eq!(visible_samples(1000, 49, 50), 1000);
        assert_eq!(visible_samples(3, 0, 10), 0);
        assert_eq!(visible_samples(3, 9, 10), 3);
        assert_eq!(visible_samples(10, 0, 0), 0);
    }

    #[test]
    fn test_pi_last_frame_shows_everything() {
        let s = samples(500);
        let frame = render_pi_frame(&s, 9, 10).unwrap();
        assert_eq!(points_of(&frame), 500);
        assert_eq!(title_of(&frame), format!("π = {:.4}", s[499].estimate));
    }

    #[test]
    fn test_pi_frames_grow() {
        let frames = render_pi_animation(&samples(1000), 50).unwrap();
        assert_eq!(frames.len(), 50);
        let counts: Vec<usize> = frames.iter().map(points_of).collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(counts[0], 20);
        assert_eq!(frames[7].index, 7);
    }

    #[test]
    fn test_pi_empty_frame_title() {
        let frame = render_pi_frame(&samples(2), 0, 5).unwrap();
        assert_eq!(points_of(&frame), 0);
        assert_eq!(title_of(&frame), "π = n/a");
    }

    #[test]
    fn test_pi_frame_errors() {
        let s = samples(10);
        assert!(render_pi_frame(&s, 0, 0).is_err());
        assert!(render_pi_frame(&s, 5, 5).is_err());
        assert!(render_pi_frame(&[], 0, 5).is_err());
        assert!(render_pi_animation(&s, 0).is_err());
    }

    #[test]
    fn test_pi_frame_deterministic() {
        let s = samples(200);
        assert_eq!(render_pi_frame(&s, 3, 8).unwrap(), render_pi_frame(&s, 3, 8).unwrap());
    }

    #[test]
    fn test_bloch_frame_contents() {
        let traj = trajectory();
        let frame = render_bloch_frame(&traj, 5).unwrap();
        let state = traj.states()[5];

        let arrows: Vec<_> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawArrow3 { tip, color, .. } => Some((*tip, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(arrows, vec![
            (state.to_array(), Color::ORANGE),
            ([0.0, 0.0, state.s3], Color::GREEN),
        ]);

        let red_paths = frame
            .commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawPath3 { color, points, .. }
                if *color == Color::RED && points.len() == traj.len()))
            .count();
        assert_eq!(red_paths, 1);

        let blue_paths = frame
            .commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::DrawPath3 { color, .. } if *color == Color::BLUE))
            .count();
        assert_eq!(blue_paths, 2 * SPHERE_RESOLUTION);
    }

    #[test]
    fn test_bloch_animation_one_frame_per_sample() {
        let traj = trajectory();
        let frames = render_bloch_animation(&traj).unwrap();
        assert_eq!(frames.len(), traj.len());
        assert!(render_bloch_frame(&traj, traj.len()).is_err());
    }

    #[test]
    fn test_sphere_wireframe_on_unit_sphere() {
        let paths = sphere_wireframe(30);
        assert_eq!(paths.len(), 60);
        for p in paths.iter().flatten() {
            let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((r - 1.0).abs() < 1e-12);
        }
    }
}
