use cgmath::{InnerSpace, One, Quaternion, Rad, Rotation, Rotation3};

use crate::error::Error;
use crate::puzzle::cube::{CubeState, LAYER_SIZE};
use crate::puzzle::notation::Move;
use crate::render::{grid_to_world, snap_to_grid, VisualCubelet};

/// Visual and logical positions closer than this are considered equal.
const EPSILON: f32 = 1e-3;

/// Cubic ease-in-out. Maps 0 to 0 and 1 to 1 with zero derivative at both
/// ends.
pub fn cubic_interpolate(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    Running,
    Finished,
}

/// The animation of one layer turning.
///
/// Advanced by `tick` once per frame. The logical cube is only touched by
/// [`TwistAnimation::complete`], which succeeds at most once.
#[derive(Debug, Clone)]
pub struct TwistAnimation {
    mv: Move,
    layer: [usize; LAYER_SIZE],
    /// Rotation of the layer after each quarter of the turn, starting with
    /// the identity. Slerping one quarter at a time keeps half turns going
    /// in the direction they were written.
    keyframes: Vec<Quaternion<f32>>,
    duration_ms: f32,
    elapsed_ms: f32,
    committed: bool,
}

impl TwistAnimation {
    pub fn new(mv: Move, layer: [usize; LAYER_SIZE], duration_ms: f32) -> Self {
        let axis = mv.axis().unit();
        let quarters = mv.quarter_turns().unsigned_abs();
        let keyframes = (0..=quarters)
            .map(|k| {
                Quaternion::from_axis_angle(axis, Rad(mv.angle() * f32::from(k) / f32::from(quarters)))
            })
            .collect();
        Self {
            mv,
            layer,
            keyframes,
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
            committed: false,
        }
    }

    pub fn mv(&self) -> Move {
        self.mv
    }

    pub fn layer(&self) -> &[usize; LAYER_SIZE] {
        &self.layer
    }

    pub fn contains(&self, piece: usize) -> bool {
        self.layer.contains(&piece)
    }

    pub fn tick(&mut self, dt_ms: f32) -> AnimationStatus {
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.duration_ms);
        if self.is_finished() {
            AnimationStatus::Finished
        } else {
            AnimationStatus::Running
        }
    }

    /// Linear progress from 0 to 1.
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        }
    }

    pub fn eased_progress(&self) -> f32 {
        cubic_interpolate(self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// The rotation to apply to the layer right now.
    pub fn rotation(&self) -> Quaternion<f32> {
        let segments = self.keyframes.len() - 1;
        if self.is_finished() {
            return self.end();
        }
        let s = self.eased_progress().clamp(0.0, 1.0) * segments as f32;
        let k = (s.floor() as usize).min(segments - 1);
        self.keyframes[k].slerp(self.keyframes[k + 1], s - k as f32)
    }

    fn end(&self) -> Quaternion<f32> {
        self.keyframes
            .last()
            .copied()
            .unwrap_or_else(Quaternion::one)
    }

    /// Finishes the turn: snaps the layer to its exact end rotation, moves
    /// the visual cubelets, commits the move to `puzzle`, and checks that
    /// both agree. On error neither `puzzle` nor `cubelets` is modified.
    pub fn complete(
        &mut self,
        puzzle: &mut CubeState,
        cubelets: &mut [VisualCubelet],
        spacing: f32,
    ) -> Result<(), Error> {
        if self.committed {
            return Err(Error::DoubleCompletion(self.mv));
        }
        self.elapsed_ms = self.duration_ms;
        let end = self.end();
        let next = puzzle.applied(self.mv)?;

        let mut moved = Vec::with_capacity(LAYER_SIZE);
        for &i in &self.layer {
            let cubelet = &cubelets[i];
            let position = snap_to_grid(end.rotate_vector(cubelet.position), spacing);
            let rotation = (end * cubelet.rotation).normalize();

            let piece = &next.pieces()[i];
            let exact = piece.orientation().to_quaternion();
            let expected = grid_to_world(piece.position(), spacing);
            if (position - expected).magnitude() > EPSILON
                || exact.dot(rotation).abs() < 1.0 - EPSILON
            {
                tracing::error!(mv = %self.mv, piece = i, "visual cubelet diverged from logical state");
                return Err(Error::InvariantViolation(format!(
                    "cubelet {i} is drawn at {position:?} but sits at {:?} after {}",
                    piece.position(),
                    self.mv
                )));
            }
            moved.push((
                i,
                VisualCubelet {
                    position: expected,
                    rotation: exact,
                },
            ));
        }

        *puzzle = next;
        for (i, cubelet) in moved {
            cubelets[i] = cubelet;
        }
        self.committed = true;
        Ok(())
    }
}
