//! Block geometry: vectors, block positions and axis-aligned cuboids.

use std::fmt::{self, Display};
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A three component vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vector3<T> {
    /// The x component.
    pub x: T,
    /// The y component.
    pub y: T,
    /// The z component.
    pub z: T,
}

impl<T> Vector3<T> {
    /// Creates a new vector.
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }
}

impl<T: Add<Output = T>> Add for Vector3<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl<T: Sub<Output = T>> Sub for Vector3<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Vector3<f64> {
    /// Returns the block containing this point.
    #[must_use]
    pub fn block_pos(self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    /// Euclidean length of the vector.
    #[must_use]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// A block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos(pub Vector3<i32>);

impl BlockPos {
    /// Creates a new block position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// The x coordinate.
    #[must_use]
    pub const fn x(self) -> i32 {
        self.0.x
    }

    /// The y coordinate.
    #[must_use]
    pub const fn y(self) -> i32 {
        self.0.y
    }

    /// The z coordinate.
    #[must_use]
    pub const fn z(self) -> i32 {
        self.0.z
    }

    /// Returns this position moved by the given offsets.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.0.x + dx, self.0.y + dy, self.0.z + dz)
    }

    /// Like [`BlockPos::offset`], but `None` if any coordinate leaves the `i32` range.
    #[must_use]
    pub const fn checked_offset(self, dx: i32, dy: i32, dz: i32) -> Option<Self> {
        let (Some(x), Some(y), Some(z)) = (
            self.0.x.checked_add(dx),
            self.0.y.checked_add(dy),
            self.0.z.checked_add(dz),
        ) else {
            return None;
        };
        Some(Self::new(x, y, z))
    }

    /// Returns this position as a point in space.
    #[must_use]
    pub fn as_vec3(self) -> Vector3<f64> {
        Vector3::new(
            f64::from(self.0.x),
            f64::from(self.0.y),
            f64::from(self.0.z),
        )
    }
}

impl Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0.x, self.0.y, self.0.z)
    }
}

/// An inclusive axis-aligned box of blocks.
///
/// `min` is component-wise less than or equal to `max`; every constructor normalises its
/// input so the invariant always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cuboid {
    min: BlockPos,
    max: BlockPos,
}

impl Cuboid {
    /// Creates the smallest cuboid containing both corners.
    #[must_use]
    pub fn from_corners(a: BlockPos, b: BlockPos) -> Self {
        Self {
            min: BlockPos::new(a.x().min(b.x()), a.y().min(b.y()), a.z().min(b.z())),
            max: BlockPos::new(a.x().max(b.x()), a.y().max(b.y()), a.z().max(b.z())),
        }
    }

    /// The minimum corner.
    #[must_use]
    pub const fn min(&self) -> BlockPos {
        self.min
    }

    /// The maximum corner.
    #[must_use]
    pub const fn max(&self) -> BlockPos {
        self.max
    }

    /// Returns true if the block lies inside the cuboid, bounds included.
    #[must_use]
    pub const fn contains(&self, pos: BlockPos) -> bool {
        pos.0.x >= self.min.0.x
            && pos.0.x <= self.max.0.x
            && pos.0.y >= self.min.0.y
            && pos.0.y <= self.max.0.y
            && pos.0.z >= self.min.0.z
            && pos.0.z <= self.max.0.z
    }

    /// Returns true if the two cuboids share at least one block.
    #[must_use]
    pub const fn intersects(&self, other: &Cuboid) -> bool {
        self.min.0.x <= other.max.0.x
            && self.max.0.x >= other.min.0.x
            && self.min.0.y <= other.max.0.y
            && self.max.0.y >= other.min.0.y
            && self.min.0.z <= other.max.0.z
            && self.max.0.z >= other.min.0.z
    }

    /// Number of blocks enclosed.
    #[must_use]
    pub fn volume(&self) -> u64 {
        let dx = u64::from((self.max.0.x - self.min.0.x).unsigned_abs()) + 1;
        let dy = u64::from((self.max.0.y - self.min.0.y).unsigned_abs()) + 1;
        let dz = u64::from((self.max.0.z - self.min.0.z).unsigned_abs()) + 1;
        dx * dy * dz
    }

    /// Distance from a point to the cuboid boundary.
    ///
    /// Inside the box (faces included) this is the distance to the nearest face. Outside it
    /// is the euclidean length of the per-axis excess.
    #[must_use]
    pub fn distance_to(&self, point: Vector3<f64>) -> f64 {
        let min = self.min.as_vec3();
        let max = self.max.as_vec3();

        let inside_x = point.x >= min.x && point.x <= max.x;
        let inside_y = point.y >= min.y && point.y <= max.y;
        let inside_z = point.z >= min.z && point.z <= max.z;

        if inside_x && inside_y && inside_z {
            return [
                (point.x - min.x).abs(),
                (point.x - max.x).abs(),
                (point.y - min.y).abs(),
                (point.y - max.y).abs(),
                (point.z - min.z).abs(),
                (point.z - max.z).abs(),
            ]
            .into_iter()
            .fold(f64::INFINITY, f64::min);
        }

        let dx = 0f64.max(min.x - point.x).max(point.x - max.x);
        let dy = 0f64.max(min.y - point.y).max(point.y - max.y);
        let dz = 0f64.max(min.z - point.z).max(point.z - max.z);
        Vector3::new(dx, dy, dz).length()
    }
}

impl Display for Cuboid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) - ({})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Cuboid {
        Cuboid::from_corners(BlockPos::new(0, 0, 0), BlockPos::new(10, 10, 10))
    }

    #[test]
    fn test_corners_are_normalised() {
        let cuboid = Cuboid::from_corners(BlockPos::new(20, 70, 20), BlockPos::new(10, 64, 10));
        assert_eq!(cuboid.min(), BlockPos::new(10, 64, 10));
        assert_eq!(cuboid.max(), BlockPos::new(20, 70, 20));
        assert_eq!(cuboid.volume(), 11 * 7 * 11);
    }

    #[test]
    fn test_distance_on_face_is_zero() {
        let cuboid = unit_box();
        assert!(cuboid.distance_to(Vector3::new(0.0, 5.0, 5.0)).abs() < f64::EPSILON);
        assert!(cuboid.distance_to(Vector3::new(5.0, 10.0, 5.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_along_one_axis() {
        let cuboid = unit_box();
        let distance = cuboid.distance_to(Vector3::new(20.0, 5.0, 5.0));
        assert!((distance - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_diagonal() {
        let cuboid = unit_box();
        let distance = cuboid.distance_to(Vector3::new(13.0, 14.0, 5.0));
        assert!((distance - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_inside_uses_nearest_face() {
        let cuboid = unit_box();
        let distance = cuboid.distance_to(Vector3::new(2.0, 5.0, 6.0));
        assert!((distance - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_intersects() {
        let a = unit_box();
        let touching = Cuboid::from_corners(BlockPos::new(10, 0, 0), BlockPos::new(15, 3, 3));
        let apart = Cuboid::from_corners(BlockPos::new(11, 0, 0), BlockPos::new(15, 3, 3));
        assert!(a.intersects(&touching));
        assert!(touching.intersects(&a));
        assert!(!a.intersects(&apart));
        assert!(a.contains(BlockPos::new(10, 10, 10)));
        assert!(!a.contains(BlockPos::new(11, 10, 10)));
    }

    #[test]
    fn test_checked_offset() {
        let pos = BlockPos::new(1, 2, 3);
        assert_eq!(pos.checked_offset(1, -2, 0), Some(BlockPos::new(2, 0, 3)));
        assert_eq!(pos.checked_offset(0, i32::MAX, 0), None);
        assert_eq!(BlockPos::new(i32::MIN, 0, 0).checked_offset(-1, 0, 0), None);
    }

    #[test]
    fn test_block_pos_display() {
        assert_eq!(BlockPos::new(10, -64, 3).to_string(), "10,-64,3");
        assert_eq!(Vector3::new(1.7, -0.2, 3.0).block_pos(), BlockPos::new(1, -1, 3));
    }
}
