//! Solved-state detection.
//!
//! Every face is read through the sticker that currently points outward,
//! which depends on each cubelet's orientation rather than on a fixed slot.

use crate::error::Error;
use crate::puzzle::common::{dot, Face};
use crate::puzzle::cube::{CubeState, SubCube, LAYER_SIZE};
use crate::util::color::Color;

/// Color of the intrinsic sticker whose current normal is most aligned
/// with `direction`.
pub fn outward_color(piece: &SubCube, direction: Face) -> Color {
    let orientation = piece.orientation();
    let outward = Face::ALL
        .into_iter()
        .max_by_key(|&intrinsic| dot(orientation.facing(intrinsic).vector(), direction.vector()))
        .unwrap_or(direction);
    piece.sticker(outward)
}

/// The outward colors of the 9 cubelets on `face`.
pub fn face_colors(state: &CubeState, face: Face) -> Result<Vec<Color>, Error> {
    let colors: Vec<_> = state
        .pieces()
        .iter()
        .filter(|piece| face.contains(piece.position()))
        .map(|piece| outward_color(piece, face))
        .collect();
    if colors.len() != LAYER_SIZE {
        return Err(Error::InvariantViolation(format!(
            "face {face} has {} cubelets",
            colors.len()
        )));
    }
    Ok(colors)
}

pub fn face_uniform(state: &CubeState, face: Face) -> Result<bool, Error> {
    let colors = face_colors(state, face)?;
    Ok(colors.iter().all(|&c| c == colors[0]))
}

pub fn is_solved(state: &CubeState) -> Result<bool, Error> {
    for face in Face::ALL {
        if !face_uniform(state, face)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Percentage of faces that are a single color.
pub fn solve_progress(state: &CubeState) -> Result<f32, Error> {
    let mut uniform = 0;
    for face in Face::ALL {
        if face_uniform(state, face)? {
            uniform += 1;
        }
    }
    Ok(uniform as f32 / Face::ALL.len() as f32 * 100.0)
}
