//! Continuous (floating point) view of the cube, kept in step with the
//! discrete [`CubeState`].

use cgmath::{Matrix4, Quaternion, Vector3};

use crate::error::Error;
use crate::puzzle::cube::{CubeState, SubCube};
use crate::puzzle::notation::Move;

pub mod animator;

use animator::{AnimationStatus, TwistAnimation};

/// Distance between neighbouring cubelet centers: cubelet size plus gap.
pub const DEFAULT_SPACING: f32 = 1.25;

pub fn grid_to_world(position: Vector3<i8>, spacing: f32) -> Vector3<f32> {
    position.map(|c| f32::from(c) * spacing)
}

/// Rounds each coordinate to the nearest grid offset, dropping the error
/// that interpolation leaves behind.
pub fn snap_to_grid(position: Vector3<f32>, spacing: f32) -> Vector3<f32> {
    position.map(|c| (c / spacing).round() * spacing)
}

/// Where a cubelet is drawn when it is not part of a turning layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualCubelet {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl VisualCubelet {
    pub fn from_piece(piece: &SubCube, spacing: f32) -> Self {
        Self {
            position: grid_to_world(piece.position(), spacing),
            rotation: piece.orientation().to_quaternion(),
        }
    }

    pub fn transform(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position) * Matrix4::from(self.rotation)
    }
}

/// A cube together with its drawn cubelets and at most one turn in flight.
#[derive(Debug, Clone)]
pub struct VisualPuzzle {
    puzzle: CubeState,
    cubelets: Vec<VisualCubelet>,
    spacing: f32,
    animation: Option<TwistAnimation>,
}

impl VisualPuzzle {
    pub fn new(puzzle: CubeState, spacing: f32) -> Self {
        let cubelets = puzzle
            .pieces()
            .iter()
            .map(|piece| VisualCubelet::from_piece(piece, spacing))
            .collect();
        Self {
            puzzle,
            cubelets,
            spacing,
            animation: None,
        }
    }

    pub fn puzzle(&self) -> &CubeState {
        &self.puzzle
    }

    pub fn puzzle_mut(&mut self) -> &mut CubeState {
        &mut self.puzzle
    }

    pub fn cubelets(&self) -> &[VisualCubelet] {
        &self.cubelets
    }

    pub fn animation(&self) -> Option<&TwistAnimation> {
        self.animation.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Starts animating `mv`. The logical cube does not change until the
    /// animation completes.
    pub fn twist(&mut self, mv: Move, duration_ms: f32) -> Result<(), Error> {
        if self.animation.is_some() {
            return Err(Error::AnimationInFlight);
        }
        let layer = self.puzzle.layer(mv.face())?;
        self.animation = Some(TwistAnimation::new(mv, layer, duration_ms));
        Ok(())
    }

    /// Advances the animation by one frame. Returns the move that was
    /// committed, if the animation finished during this frame.
    pub fn update(&mut self, elapsed_ms: f32) -> Result<Option<Move>, Error> {
        match self.animation.as_mut().map(|anim| anim.tick(elapsed_ms)) {
            Some(AnimationStatus::Finished) => self.finish(),
            Some(AnimationStatus::Running) | None => Ok(None),
        }
    }

    /// Jumps the in-flight animation, if any, to its end and commits it.
    pub fn force_complete(&mut self) -> Result<Option<Move>, Error> {
        self.finish()
    }

    fn finish(&mut self) -> Result<Option<Move>, Error> {
        let Some(mut animation) = self.animation.take() else {
            return Ok(None);
        };
        animation.complete(&mut self.puzzle, &mut self.cubelets, self.spacing)?;
        Ok(Some(animation.mv()))
    }

    /// Replaces the cube and redraws every cubelet. Any in-flight animation
    /// is discarded without being committed.
    pub fn replace(&mut self, puzzle: CubeState) {
        *self = Self::new(puzzle, self.spacing);
    }

    /// Model matrix of every cubelet for the current frame, including the
    /// rotation of the turning layer.
    pub fn transforms(&self) -> Vec<Matrix4<f32>> {
        let layer_rotation = self
            .animation
            .as_ref()
            .map(|anim| (anim, Matrix4::from(anim.rotation())));
        self.cubelets
            .iter()
            .enumerate()
            .map(|(i, cubelet)| match &layer_rotation {
                Some((anim, rotation)) if anim.contains(i) => *rotation * cubelet.transform(),
                _ => cubelet.transform(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::notation::parse;
    use cgmath::{InnerSpace, Vector4};

    fn puzzle() -> VisualPuzzle {
        VisualPuzzle::new(CubeState::default(), DEFAULT_SPACING)
    }

    #[test]
    fn snapping_removes_drift() {
        let drifted = Vector3::new(1.2500003, -0.0000004, -1.2499998);
        assert_eq!(
            snap_to_grid(drifted, DEFAULT_SPACING),
            Vector3::new(DEFAULT_SPACING, 0.0, -DEFAULT_SPACING)
        );
    }

    #[test]
    fn one_twist_at_a_time() {
        let mut p = puzzle();
        p.twist(parse("R").unwrap(), 100.0).unwrap();
        assert_eq!(
            p.twist(parse("U").unwrap(), 100.0),
            Err(Error::AnimationInFlight)
        );
        assert!(p.is_animating());
    }

    #[test]
    fn logical_state_changes_only_on_completion() {
        let mut p = puzzle();
        p.twist(parse("F").unwrap(), 100.0).unwrap();
        assert_eq!(p.update(60.0), Ok(None));
        assert!(p.puzzle().is_solved());
        assert_eq!(p.update(60.0), Ok(Some(parse("F").unwrap())));
        assert!(!p.puzzle().is_solved());
        assert!(!p.is_animating());
        assert_eq!(p.update(60.0), Ok(None));
    }

    #[test]
    fn transforms_rotate_only_the_layer() {
        let mut p = puzzle();
        p.twist(parse("U").unwrap(), 100.0).unwrap();
        p.update(50.0).unwrap();
        let layer = *p.animation().unwrap().layer();
        let transforms = p.transforms();
        for (i, (transform, cubelet)) in transforms.iter().zip(p.cubelets()).enumerate() {
            let center = *transform * Vector4::new(0.0, 0.0, 0.0, 1.0);
            let drawn = Vector3::new(center.x, center.y, center.z);
            if layer.contains(&i) {
                // Turning cubelets keep their height and distance to the axis.
                assert!((drawn.y - cubelet.position.y).abs() < 1e-4);
                let r0 = Vector3::new(cubelet.position.x, 0.0, cubelet.position.z).magnitude();
                let r1 = Vector3::new(drawn.x, 0.0, drawn.z).magnitude();
                assert!((r0 - r1).abs() < 1e-4);
            } else {
                assert_eq!(*transform, cubelet.transform());
            }
        }
    }

    #[test]
    fn force_complete_commits_immediately() {
        let mut p = puzzle();
        p.twist(parse("L'").unwrap(), 1000.0).unwrap();
        assert_eq!(p.force_complete(), Ok(Some(parse("L'").unwrap())));
        assert_eq!(
            *p.puzzle(),
            CubeState::default().applied(parse("L'").unwrap()).unwrap()
        );
        assert_eq!(p.force_complete(), Ok(None));
    }

    #[test]
    fn replace_redraws_solved() {
        let mut p = puzzle();
        p.twist(parse("B").unwrap(), 0.0).unwrap();
        p.update(0.0).unwrap();
        p.twist(parse("D").unwrap(), 100.0).unwrap();
        p.replace(CubeState::default());
        assert!(!p.is_animating());
        assert!(p.puzzle().is_solved());
        // No cubelet is rotated on a solved cube.
        for (t, cubelet) in p.transforms().iter().zip(p.cubelets()) {
            assert_eq!(*t, Matrix4::from_translation(cubelet.position));
        }
    }
}
