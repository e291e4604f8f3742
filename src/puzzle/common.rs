use cgmath::{Matrix3, Quaternion, Vector3};
use enum_map::{Enum, EnumMap};
use std::fmt;
use std::ops::{Add, Neg, Sub};

use crate::util::enum_iter;

#[derive(Debug, Enum, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Basis {
    X,
    Y,
    Z,
}

/// Cyclic difference between two bases, counting X -> Y -> Z -> X.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisDiff {
    D0,
    D1,
    D2,
}

impl Basis {
    pub fn index(self) -> usize {
        match self {
            Basis::X => 0,
            Basis::Y => 1,
            Basis::Z => 2,
        }
    }

    fn from_index(i: usize) -> Self {
        match i % 3 {
            0 => Basis::X,
            1 => Basis::Y,
            _ => Basis::Z,
        }
    }

    pub fn unit(self) -> Vector3<f32> {
        let mut v = Vector3::new(0.0, 0.0, 0.0);
        v[self.index()] = 1.0;
        v
    }
}

impl BasisDiff {
    fn steps(self) -> usize {
        match self {
            BasisDiff::D0 => 0,
            BasisDiff::D1 => 1,
            BasisDiff::D2 => 2,
        }
    }
}

impl Sub for Basis {
    type Output = BasisDiff;

    fn sub(self, rhs: Self) -> BasisDiff {
        match (self.index() + 3 - rhs.index()) % 3 {
            0 => BasisDiff::D0,
            1 => BasisDiff::D1,
            _ => BasisDiff::D2,
        }
    }
}

impl Add<BasisDiff> for Basis {
    type Output = Basis;

    fn add(self, rhs: BasisDiff) -> Basis {
        Basis::from_index(self.index() + rhs.steps())
    }
}

#[derive(Debug, Enum, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Pos,
    Neg,
}

impl Sign {
    pub fn to_i8(self) -> i8 {
        match self {
            Sign::Pos => 1,
            Sign::Neg => -1,
        }
    }

    /// The sign of a nonzero coordinate.
    pub fn of(value: i8) -> Option<Self> {
        match value {
            0 => None,
            v if v > 0 => Some(Sign::Pos),
            _ => Some(Sign::Neg),
        }
    }
}

impl Neg for Sign {
    type Output = Sign;

    fn neg(self) -> Sign {
        match self {
            Sign::Pos => Sign::Neg,
            Sign::Neg => Sign::Pos,
        }
    }
}

/// One of the six outward directions of the cube, which doubles as the name
/// of the face lying in that direction.
///
/// +X: R, +Y: U, +Z: F
#[derive(Debug, Enum, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Face(pub Basis, pub Sign);

impl Face {
    /// Notation order.
    pub const ALL: [Face; 6] = [name::R, name::L, name::U, name::D, name::F, name::B];

    /// Rotates this direction by 90 degrees counterclockwise about the
    /// positive `axis` (right-hand rule).
    pub fn turn_one(&self, axis: Basis) -> Self {
        match axis - self.0 {
            BasisDiff::D0 => *self,
            BasisDiff::D1 => Face(self.0 + BasisDiff::D2, -self.1),
            BasisDiff::D2 => Face(self.0 + BasisDiff::D1, self.1),
        }
    }

    pub fn turn(&self, axis: Basis, steps: u8) -> Self {
        (0..steps % 4).fold(*self, |face, _| face.turn_one(axis))
    }

    /// Integer unit vector pointing out of this face.
    pub fn vector(&self) -> Vector3<i8> {
        let mut v = Vector3::new(0, 0, 0);
        v[self.0.index()] = self.1.to_i8();
        v
    }

    pub fn to_vec(&self) -> Vector3<f32> {
        self.0.unit() * f32::from(self.1.to_i8())
    }

    /// Whether an integer grid position lies on this face's layer.
    pub fn contains(&self, position: Vector3<i8>) -> bool {
        position[self.0.index()] == self.1.to_i8()
    }

    /// The face whose direction is best aligned with `normal`, e.g. the
    /// normal of a sticker that was tapped.
    pub fn from_normal(normal: Vector3<f32>) -> Face {
        Face::ALL
            .into_iter()
            .max_by(|a, b| dot_f32(a.to_vec(), normal).total_cmp(&dot_f32(b.to_vec(), normal)))
            .unwrap_or(name::U)
    }

    pub fn name(&self) -> char {
        match self {
            Face(Basis::X, Sign::Pos) => 'R',
            Face(Basis::X, Sign::Neg) => 'L',
            Face(Basis::Y, Sign::Pos) => 'U',
            Face(Basis::Y, Sign::Neg) => 'D',
            Face(Basis::Z, Sign::Pos) => 'F',
            Face(Basis::Z, Sign::Neg) => 'B',
        }
    }

    pub fn from_name(name: char) -> Option<Face> {
        Face::ALL.into_iter().find(|face| face.name() == name)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub mod name {
    use super::*;

    pub const R: Face = Face(Basis::X, Sign::Pos);
    pub const L: Face = Face(Basis::X, Sign::Neg);
    pub const U: Face = Face(Basis::Y, Sign::Pos);
    pub const D: Face = Face(Basis::Y, Sign::Neg);
    pub const F: Face = Face(Basis::Z, Sign::Pos);
    pub const B: Face = Face(Basis::Z, Sign::Neg);
}

fn dot_f32(a: Vector3<f32>, b: Vector3<f32>) -> f32 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

pub fn dot(a: Vector3<i8>, b: Vector3<i8>) -> i8 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Rotates a grid position by `steps` quarter turns about the positive
/// `axis`, using the same direction table as [`Face::turn_one`].
pub fn turn_position(position: Vector3<i8>, axis: Basis, steps: u8) -> Vector3<i8> {
    let mut out = Vector3::new(0, 0, 0);
    for basis in enum_iter::<Basis>() {
        let coord = position[basis.index()];
        if let Some(sign) = Sign::of(coord) {
            let Face(new_basis, new_sign) = Face(basis, sign).turn(axis, steps);
            out[new_basis.index()] = coord.abs() * new_sign.to_i8();
        }
    }
    out
}

/// A rotation of a cubelet, as one of the 24 proper symmetries of the cube.
///
/// Maps each intrinsic face of the cubelet (the direction it faced when the
/// cube was built) to the world direction it faces now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation(EnumMap<Face, Face>);

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Orientation {
    pub fn identity() -> Self {
        Self(EnumMap::from_fn(|face| face))
    }

    /// The world direction the intrinsic face `intrinsic` currently faces.
    pub fn facing(&self, intrinsic: Face) -> Face {
        self.0[intrinsic]
    }

    pub fn turned(&self, axis: Basis, steps: u8) -> Self {
        Self(EnumMap::from_fn(|face| self.0[face].turn(axis, steps)))
    }

    /// Applies `self`, then `other`.
    pub fn then(&self, other: &Self) -> Self {
        Self(EnumMap::from_fn(|face| other.0[self.0[face]]))
    }

    pub fn inverse(&self) -> Self {
        let mut inv = Self::identity();
        for (intrinsic, &world) in self.0.iter() {
            inv.0[world] = intrinsic;
        }
        inv
    }

    /// All 24 rotations, starting with the identity.
    pub fn group() -> Vec<Self> {
        let mut elements = vec![Self::identity()];
        let mut i = 0;
        while i < elements.len() {
            for axis in enum_iter::<Basis>() {
                let next = elements[i].turned(axis, 1);
                if !elements.contains(&next) {
                    elements.push(next);
                }
            }
            i += 1;
        }
        elements
    }

    pub fn to_matrix(&self) -> Matrix3<f32> {
        Matrix3::from_cols(
            self.facing(name::R).to_vec(),
            self.facing(name::U).to_vec(),
            self.facing(name::F).to_vec(),
        )
    }

    pub fn to_quaternion(&self) -> Quaternion<f32> {
        Quaternion::from(self.to_matrix())
    }

    /// Names of the directions faced by R, L, U, D, F, B in that order.
    pub fn names(&self) -> Vec<char> {
        Face::ALL.iter().map(|&face| self.facing(face).name()).collect()
    }
}

#[cfg(test)]
pub mod geometry_tests {
    use super::*;
    use cgmath::{Deg, InnerSpace, Rotation};
    use itertools::Itertools;

    const EPSILON: f32 = 1e-4;

    fn turns_permutations() {
        for axis in enum_iter::<Basis>() {
            for faces in enum_iter::<Face>().combinations(2) {
                assert!(
                    faces[0].turn_one(axis) != faces[1].turn_one(axis),
                    "{:?} and {:?} turn the same under {:?}",
                    faces[0],
                    faces[1],
                    axis
                );
            }
        }
    }

    fn turns_have_order_four() {
        for axis in enum_iter::<Basis>() {
            for face in enum_iter::<Face>() {
                assert_eq!(face.turn(axis, 4), face);
                if face.0 == axis {
                    assert_eq!(face.turn_one(axis), face);
                } else {
                    assert_ne!(face.turn(axis, 2), face.turn(axis, 1));
                    assert_eq!(face.turn(axis, 2), Face(face.0, -face.1));
                }
            }
        }
    }

    fn turn_matches_matrix() {
        for axis in enum_iter::<Basis>() {
            let mat = Matrix3::from_axis_angle(axis.unit(), Deg(90.0));
            for face in enum_iter::<Face>() {
                let concrete = mat * face.to_vec();
                let abstr = face.turn_one(axis).to_vec();
                assert!(
                    (concrete - abstr).magnitude() < EPSILON,
                    "turning {face:?} about {axis:?} gives {abstr:?}, matrix gives {concrete:?}"
                );
            }
        }
    }

    fn quaternions_match_orientations() {
        for orientation in Orientation::group() {
            let q = orientation.to_quaternion();
            assert!((q.magnitude() - 1.0).abs() < EPSILON);
            for face in enum_iter::<Face>() {
                let rotated = q.rotate_vector(face.to_vec());
                let expected = orientation.facing(face).to_vec();
                assert!(
                    (rotated - expected).magnitude() < EPSILON,
                    "{orientation:?} sends {face:?} to {expected:?}, quaternion gives {rotated:?}"
                );
            }
        }
    }

    pub fn validate_geometry() {
        turns_permutations();
        turns_have_order_four();
        turn_matches_matrix();
        quaternions_match_orientations();
    }

    #[test]
    fn validate_cube_geometry() {
        validate_geometry()
    }

    #[test]
    fn rotation_group_has_24_elements() {
        let group = Orientation::group();
        assert_eq!(group.len(), 24);
        assert_eq!(group[0], Orientation::identity());
    }

    #[test]
    fn inverse_and_composition() {
        for a in Orientation::group() {
            assert_eq!(a.then(&a.inverse()), Orientation::identity());
            assert_eq!(a.inverse().then(&a), Orientation::identity());
            for axis in enum_iter::<Basis>() {
                let turn = Orientation::identity().turned(axis, 1);
                assert_eq!(a.then(&turn), a.turned(axis, 1));
            }
        }
    }

    #[test]
    fn position_turns_stay_on_grid() {
        use name::*;
        // +90 about +X sends U to F, so (0, 1, 0) goes to (0, 0, 1).
        assert_eq!(turn_position(U.vector(), Basis::X, 1), F.vector());
        assert_eq!(
            turn_position(Vector3::new(1, 1, 1), Basis::Y, 1),
            Vector3::new(1, 1, -1)
        );
        for axis in enum_iter::<Basis>() {
            let p = Vector3::new(1, -1, 0);
            assert_eq!(turn_position(p, axis, 4), p);
        }
    }

    #[test]
    fn face_from_normal() {
        use name::*;
        assert_eq!(Face::from_normal(Vector3::new(0.9, 0.1, -0.2)), R);
        assert_eq!(Face::from_normal(Vector3::new(0.0, -0.7, 0.6)), D);
        assert_eq!(Face::from_normal(Vector3::new(0.1, 0.2, -3.0)), B);
    }

    #[test]
    fn face_names_round_trip() {
        for face in Face::ALL {
            assert_eq!(Face::from_name(face.name()), Some(face));
        }
        assert_eq!(Face::from_name('X'), None);
    }
}
