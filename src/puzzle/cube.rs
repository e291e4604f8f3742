use cgmath::Vector3;
use enum_map::{enum_map, EnumMap};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::puzzle::common::{turn_position, Basis, Face, Orientation, Sign};
use crate::puzzle::notation::Move;
use crate::puzzle::solved;
use crate::util::color::{self, Color};

pub const PIECE_COUNT: usize = 27;
pub const LAYER_SIZE: usize = 9;

pub fn default_colors() -> EnumMap<Face, Color> {
    enum_map! {
        Face(Basis::X, Sign::Pos) => color::RED,
        Face(Basis::X, Sign::Neg) => color::ORANGE,
        Face(Basis::Y, Sign::Pos) => color::WHITE,
        Face(Basis::Y, Sign::Neg) => color::YELLOW,
        Face(Basis::Z, Sign::Pos) => color::GREEN,
        Face(Basis::Z, Sign::Neg) => color::BLUE,
    }
}

/// One of the 27 cubelets.
#[derive(Debug, Clone, PartialEq)]
pub struct SubCube {
    /// Position in the solved cube; never changes.
    home: Vector3<i8>,
    /// Current grid position, each coordinate in {-1, 0, 1}.
    position: Vector3<i8>,
    orientation: Orientation,
    /// Color of each intrinsic face. Faces that point into the cube when
    /// solved are black.
    stickers: EnumMap<Face, Color>,
}

impl SubCube {
    fn make_solved(home: Vector3<i8>, colors: &EnumMap<Face, Color>) -> Self {
        Self {
            home,
            position: home,
            orientation: Orientation::identity(),
            stickers: EnumMap::from_fn(|face: Face| {
                if face.contains(home) {
                    colors[face]
                } else {
                    color::BLACK
                }
            }),
        }
    }

    pub fn home(&self) -> Vector3<i8> {
        self.home
    }

    pub fn position(&self) -> Vector3<i8> {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn sticker(&self, intrinsic: Face) -> Color {
        self.stickers[intrinsic]
    }

    pub fn stickers(&self) -> &EnumMap<Face, Color> {
        &self.stickers
    }
}

/// Logical state of the whole cube.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeState {
    pieces: Vec<SubCube>,
    /// Cached result of the solved-state detector.
    solved: bool,
    move_count: u32,
}

impl Default for CubeState {
    fn default() -> Self {
        Self::new(&default_colors())
    }
}

impl CubeState {
    pub fn new(colors: &EnumMap<Face, Color>) -> Self {
        let pieces = (-1..=1)
            .cartesian_product(-1..=1)
            .cartesian_product(-1..=1)
            .map(|((x, y), z)| SubCube::make_solved(Vector3::new(x, y, z), colors))
            .collect();
        Self {
            pieces,
            solved: true,
            move_count: 0,
        }
    }

    pub fn pieces(&self) -> &[SubCube] {
        &self.pieces
    }

    pub fn piece_at(&self, position: Vector3<i8>) -> Option<&SubCube> {
        self.pieces.iter().find(|piece| piece.position == position)
    }

    pub fn piece_from_home(&self, home: Vector3<i8>) -> Option<&SubCube> {
        self.pieces.iter().find(|piece| piece.home == home)
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn record_move(&mut self) {
        self.move_count += 1;
    }

    pub fn reset_move_count(&mut self) {
        self.move_count = 0;
    }

    /// Indices of the cubelets currently on `face`.
    pub fn select_face(&self, face: Face) -> Vec<usize> {
        self.pieces
            .iter()
            .positions(|piece| face.contains(piece.position))
            .collect()
    }

    /// Like [`Self::select_face`], but a layer that is not exactly 9
    /// cubelets is an error.
    pub fn layer(&self, face: Face) -> Result<[usize; LAYER_SIZE], Error> {
        <[usize; LAYER_SIZE]>::try_from(self.select_face(face))
            .map_err(|selected| Error::InvalidMove {
                face,
                count: selected.len(),
            })
    }

    /// Turns one face. Either the whole turn is applied or, if an invariant
    /// would break, nothing is.
    pub fn apply_move(&mut self, mv: Move) -> Result<(), Error> {
        let layer = self.layer(mv.face())?;
        let axis = mv.axis();
        let steps = mv.steps();

        let mut positions: Vec<_> = self.pieces.iter().map(|piece| piece.position).collect();
        for &i in &layer {
            positions[i] = turn_position(positions[i], axis, steps);
        }
        check_permutation(&positions)?;

        let mut next = self.clone();
        for &i in &layer {
            let piece = &mut next.pieces[i];
            piece.position = positions[i];
            piece.orientation = piece.orientation.turned(axis, steps);
        }
        next.solved = solved::is_solved(&next)?;
        *self = next;
        Ok(())
    }

    pub fn applied(&self, mv: Move) -> Result<Self, Error> {
        let mut new = self.clone();
        new.apply_move(mv)?;
        Ok(new)
    }

    /// Position, orientation and stickers of every cubelet, for rendering
    /// or logging.
    pub fn snapshot(&self, animating: bool) -> CubeSnapshot {
        CubeSnapshot {
            move_count: self.move_count,
            solved: self.solved,
            animating,
            pieces: self
                .pieces
                .iter()
                .map(|piece| SubCubeSnapshot {
                    home: piece.home.into(),
                    position: piece.position.into(),
                    orientation: piece.orientation.names(),
                    stickers: Face::ALL.iter().map(|&face| piece.stickers[face]).collect(),
                })
                .collect(),
        }
    }
}

/// Every position must be a distinct point of {-1, 0, 1}³.
fn check_permutation(positions: &[Vector3<i8>]) -> Result<(), Error> {
    if positions.len() != PIECE_COUNT {
        return Err(Error::InvariantViolation(format!(
            "{} cubelets instead of {PIECE_COUNT}",
            positions.len()
        )));
    }
    if let Some(p) = positions
        .iter()
        .find(|p| [p.x, p.y, p.z].iter().any(|c| !(-1..=1).contains(c)))
    {
        return Err(Error::InvariantViolation(format!(
            "cubelet left the grid at {p:?}"
        )));
    }
    if !positions.iter().map(|p| (p.x, p.y, p.z)).all_unique() {
        return Err(Error::InvariantViolation(
            "two cubelets share a position".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCubeSnapshot {
    pub home: [i8; 3],
    pub position: [i8; 3],
    /// Directions currently faced by the intrinsic R, L, U, D, F, B faces.
    pub orientation: Vec<char>,
    /// Colors of the intrinsic R, L, U, D, F, B faces.
    pub stickers: Vec<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeSnapshot {
    pub move_count: u32,
    pub solved: bool,
    pub animating: bool,
    pub pieces: Vec<SubCubeSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::common::name::*;
    use crate::puzzle::notation::{parse, parse_sequence};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn apply_all(state: &mut CubeState, moves: &str) {
        for mv in parse_sequence(moves).unwrap() {
            state.apply_move(mv).unwrap();
        }
    }

    fn all_moves() -> Vec<Move> {
        Face::ALL
            .into_iter()
            .cartesian_product([-2, -1, 1, 2])
            .map(|(face, q)| Move::new(face, q).unwrap())
            .collect()
    }

    fn random_state(seed: u64, len: usize) -> CubeState {
        let mut rng = StdRng::seed_from_u64(seed);
        let moves = all_moves();
        let mut state = CubeState::default();
        for _ in 0..len {
            state.apply_move(moves[rng.gen_range(0..moves.len())]).unwrap();
        }
        state
    }

    #[test]
    fn new_cube_is_solved() {
        let state = CubeState::default();
        assert!(state.is_solved());
        assert_eq!(state.pieces().len(), PIECE_COUNT);
        assert_eq!(state.move_count(), 0);
    }

    /// Applies one turn and asserts that it is unsolved.
    #[test]
    fn one_turn() {
        for face in Face::ALL {
            for q in [-1, 1] {
                let state = CubeState::default()
                    .applied(Move::new(face, q).unwrap())
                    .unwrap();
                assert!(!state.is_solved(), "{face}{q} left the cube solved");
            }
        }
    }

    #[test]
    fn four_quarter_turns_cycle() {
        let start = random_state(7, 30);
        for face in Face::ALL {
            let mv = Move::new(face, 1).unwrap();
            let mut state = start.clone();
            for i in 0..4 {
                if i > 0 {
                    assert_ne!(state, start, "{mv} has order {i}");
                }
                state.apply_move(mv).unwrap();
            }
            assert_eq!(state, start);
        }
    }

    #[test]
    fn inverse_undoes_every_move() {
        let start = random_state(11, 40);
        for mv in all_moves() {
            let there_and_back = start.applied(mv).unwrap().applied(mv.inverse()).unwrap();
            assert_eq!(there_and_back, start, "{mv} then {}", mv.inverse());
        }
    }

    #[test]
    fn positions_remain_a_permutation() {
        for seed in 0..20 {
            let state = random_state(seed, 200);
            let positions: Vec<_> = state.pieces().iter().map(|p| p.position()).collect();
            assert!(check_permutation(&positions).is_ok());
            for face in Face::ALL {
                assert_eq!(state.select_face(face).len(), LAYER_SIZE);
            }
        }
    }

    #[test]
    fn half_turn_is_two_quarter_turns() {
        let mut twice = CubeState::default();
        apply_all(&mut twice, "R R");
        let mut half = CubeState::default();
        apply_all(&mut half, "R2");
        assert_eq!(half, twice);

        let start = random_state(3, 25);
        for face in Face::ALL {
            let q = Move::new(face, 1).unwrap();
            let h = Move::new(face, 2).unwrap();
            let h_prime = Move::new(face, -2).unwrap();
            let by_quarters = start.applied(q).unwrap().applied(q).unwrap();
            assert_eq!(start.applied(h).unwrap(), by_quarters);
            assert_eq!(start.applied(h_prime).unwrap(), by_quarters);
        }
    }

    /// (R U R' U') has order 6.
    #[test]
    fn six_sexy() {
        let mut state = CubeState::default();
        for i in 1..=6 {
            apply_all(&mut state, "R U R' U'");
            assert_eq!(state.is_solved(), i == 6, "after {i} repetitions");
        }
        assert_eq!(state, CubeState::default());
    }

    #[test]
    fn opposite_faces_commute() {
        let start = random_state(5, 10);
        let mut a = start.clone();
        apply_all(&mut a, "R L'");
        let mut b = start;
        apply_all(&mut b, "L' R");
        assert_eq!(a, b);
    }

    #[test]
    fn r_turn_moves_front_to_top() {
        // Clockwise seen from the right: the front-right edge goes up.
        let state = CubeState::default().applied(parse("R").unwrap()).unwrap();
        let piece = state.piece_from_home(Vector3::new(1, 0, 1)).unwrap();
        assert_eq!(piece.position(), Vector3::new(1, 1, 0));
        assert_eq!(piece.orientation().facing(F), U);
        // Centers keep their position but rotate.
        let center = state.piece_from_home(Vector3::new(1, 0, 0)).unwrap();
        assert_eq!(center.position(), Vector3::new(1, 0, 0));
        assert_eq!(center.orientation().facing(U), B);
    }

    #[test]
    fn layer_has_nine_cubelets() {
        let state = CubeState::default();
        for face in Face::ALL {
            let layer = state.layer(face).unwrap();
            assert!(layer
                .iter()
                .all(|&i| face.contains(state.pieces()[i].position())));
        }
    }

    #[test]
    fn interior_stickers_are_black() {
        let state = CubeState::default();
        let core = state.piece_from_home(Vector3::new(0, 0, 0)).unwrap();
        assert!(core.stickers().values().all(|&c| c == color::BLACK));
        let corner = state.piece_from_home(Vector3::new(1, 1, 1)).unwrap();
        assert_eq!(corner.sticker(R), color::RED);
        assert_eq!(corner.sticker(U), color::WHITE);
        assert_eq!(corner.sticker(F), color::GREEN);
        assert_eq!(corner.sticker(L), color::BLACK);
    }

    #[test]
    fn failed_move_leaves_state_untouched() {
        let mut state = CubeState::default();
        apply_all(&mut state, "R U");
        // Two cubelets off the F layer now share a position.
        let off_layer: Vec<_> = (0..PIECE_COUNT)
            .filter(|&i| !F.contains(state.pieces[i].position))
            .collect();
        state.pieces[off_layer[0]].position = state.pieces[off_layer[1]].position;
        let before = state.clone();

        assert!(matches!(
            state.apply_move(parse("F").unwrap()),
            Err(Error::InvariantViolation(_))
        ));
        assert_eq!(state, before);
        assert!(!state.is_solved());
    }

    #[test]
    fn corrupted_positions_are_rejected() {
        let mut positions: Vec<_> = CubeState::default()
            .pieces()
            .iter()
            .map(|p| p.position())
            .collect();
        positions[0] = positions[1];
        assert!(matches!(
            check_permutation(&positions),
            Err(Error::InvariantViolation(_))
        ));
        positions[0] = Vector3::new(2, 0, 0);
        assert!(check_permutation(&positions).is_err());
    }

    #[test]
    fn snapshot_serializes() {
        let mut state = CubeState::default();
        apply_all(&mut state, "F");
        let snapshot = state.snapshot(false);
        assert_eq!(snapshot.pieces.len(), PIECE_COUNT);
        assert!(!snapshot.solved);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: CubeSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
