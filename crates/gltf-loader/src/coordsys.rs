//! Coordinate system conventions and the matrices converting between them.
//!
//! glTF is Y-up right-handed. The target scene defaults to Z-up
//! right-handed; vertices and node transforms are converted on the way in.

use std::fmt;
use std::str::FromStr;

use glam::{Mat3, Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoordinateSystem {
    #[default]
    ZupRight,
    YupRight,
    ZupLeft,
    YupLeft,
}

impl CoordinateSystem {
    pub const ALL: [CoordinateSystem; 4] = [
        CoordinateSystem::ZupRight,
        CoordinateSystem::YupRight,
        CoordinateSystem::ZupLeft,
        CoordinateSystem::YupLeft,
    ];

    pub fn right(self) -> Vec3 {
        Vec3::X
    }

    pub fn forward(self) -> Vec3 {
        match self {
            CoordinateSystem::ZupRight => Vec3::Y,
            CoordinateSystem::YupRight => Vec3::NEG_Z,
            CoordinateSystem::ZupLeft => Vec3::NEG_Y,
            CoordinateSystem::YupLeft => Vec3::Z,
        }
    }

    pub fn up(self) -> Vec3 {
        match self {
            CoordinateSystem::ZupRight | CoordinateSystem::ZupLeft => Vec3::Z,
            CoordinateSystem::YupRight | CoordinateSystem::YupLeft => Vec3::Y,
        }
    }

    pub fn is_right_handed(self) -> bool {
        matches!(self, CoordinateSystem::ZupRight | CoordinateSystem::YupRight)
    }

    /// Columns are the right, forward and up axes.
    fn basis(self) -> Mat3 {
        Mat3::from_cols(self.right(), self.forward(), self.up())
    }

    /// The matrix that takes points expressed in `from` to the same points
    /// expressed in `to`.
    pub fn convert_mat(from: CoordinateSystem, to: CoordinateSystem) -> Mat4 {
        if from == to {
            return Mat4::IDENTITY;
        }
        // Both bases are orthonormal, so the inverse is the transpose.
        Mat4::from_mat3(to.basis() * from.basis().transpose())
    }

    pub fn name(self) -> &'static str {
        match self {
            CoordinateSystem::ZupRight => "zup-right",
            CoordinateSystem::YupRight => "yup-right",
            CoordinateSystem::ZupLeft => "zup-left",
            CoordinateSystem::YupLeft => "yup-left",
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CoordinateSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zup" | "zup-right" | "z-up" => Ok(CoordinateSystem::ZupRight),
            "yup" | "yup-right" | "y-up" => Ok(CoordinateSystem::YupRight),
            "zup-left" => Ok(CoordinateSystem::ZupLeft),
            "yup-left" => Ok(CoordinateSystem::YupLeft),
            _ => Err(format!("unknown coordinate system {:?}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yup_to_zup() {
        let m = CoordinateSystem::convert_mat(CoordinateSystem::YupRight, CoordinateSystem::ZupRight);
        assert!(m.transform_vector3(Vec3::Y).abs_diff_eq(Vec3::Z, 1e-6));
        assert!(m.transform_vector3(Vec3::NEG_Z).abs_diff_eq(Vec3::Y, 1e-6));
        assert!(m.transform_vector3(Vec3::X).abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_conversions_invert() {
        for from in CoordinateSystem::ALL {
            for to in CoordinateSystem::ALL {
                let there = CoordinateSystem::convert_mat(from, to);
                let back = CoordinateSystem::convert_mat(to, from);
                assert!((back * there).abs_diff_eq(Mat4::IDENTITY, 1e-6), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_handedness_flip_mirrors() {
        let m = CoordinateSystem::convert_mat(CoordinateSystem::ZupRight, CoordinateSystem::ZupLeft);
        assert!(m.determinant() < 0.0);
        let m = CoordinateSystem::convert_mat(CoordinateSystem::YupRight, CoordinateSystem::ZupRight);
        assert!(m.determinant() > 0.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("zup".parse::<CoordinateSystem>(), Ok(CoordinateSystem::ZupRight));
        assert_eq!("Y-UP".parse::<CoordinateSystem>(), Ok(CoordinateSystem::YupRight));
        assert!("sideways".parse::<CoordinateSystem>().is_err());
    }
}
