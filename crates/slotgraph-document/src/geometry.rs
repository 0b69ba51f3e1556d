//! Vectors, placements and resolved model descriptors
//!
//! Locations are authored as six-value strings (`"x y z rx ry rz"`,
//! rotations in degrees). Composition of a parent and a child location is
//! either rigid (rotation-aware) or plain per-axis addition.

use crate::schema::ModelSpec;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Three-component vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// All zeros
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All ones
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    #[must_use]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Component-wise comparison within `epsilon`
    #[must_use]
    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

// Authored vectors show up both as `[x, y, z]` and `{x, y, z}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawVec3 {
    Array(Vec<f64>),
    Object {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

impl<'de> Deserialize<'de> for Vec3 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawVec3::deserialize(deserializer)? {
            RawVec3::Array(values) if values.len() == 3 => {
                Ok(Self::new(values[0], values[1], values[2]))
            }
            RawVec3::Array(values) => Err(de::Error::invalid_length(values.len(), &"3 components")),
            RawVec3::Object { x, y, z } => Ok(Self::new(x, y, z)),
        }
    }
}

/// How a child location is combined with its parent's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformComposition {
    /// Child offset is rotated into the parent frame; rotations compose as matrices
    #[default]
    Rigid,
    /// Offsets and rotations add per axis
    Additive,
}

/// Offset plus rotation (degrees)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub offset: Vec3,
    pub rotation: Vec3,
}

impl Location {
    /// Identity placement
    pub const ORIGIN: Self = Self {
        offset: Vec3::ZERO,
        rotation: Vec3::ZERO,
    };

    #[inline]
    #[must_use]
    pub const fn new(offset: Vec3, rotation: Vec3) -> Self {
        Self { offset, rotation }
    }

    /// Place `child`, expressed in this location's frame, into the outer frame
    #[must_use]
    pub fn compose(&self, child: &Self, mode: TransformComposition) -> Self {
        match mode {
            TransformComposition::Additive => Self::new(
                self.offset.add(child.offset),
                self.rotation.add(child.rotation),
            ),
            TransformComposition::Rigid => {
                let parent = Mat3::from_euler_degrees(self.rotation);
                let offset = self.offset.add(parent.mul_vec(child.offset));
                let rotation = parent
                    .mul(&Mat3::from_euler_degrees(child.rotation))
                    .to_euler_degrees();
                Self::new(offset, rotation)
            }
        }
    }

    /// Comparison within `epsilon` on every component
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.offset.approx_eq(other.offset, epsilon)
            && self.rotation.approx_eq(other.rotation, epsilon)
    }
}

impl FromStr for Location {
    type Err = LocationError;

    /// Parse `"x y z rx ry rz"`; commas also separate, missing values are 0
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<f64>()
                    .map_err(|_| LocationError::InvalidNumber(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if values.len() > 6 {
            return Err(LocationError::TooManyValues(values.len()));
        }
        let at = |i: usize| values.get(i).copied().unwrap_or(0.0);
        Ok(Self::new(
            Vec3::new(at(0), at(1), at(2)),
            Vec3::new(at(3), at(4), at(5)),
        ))
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (o, r) = (self.offset, self.rotation);
        write!(f, "{} {} {} {} {} {}", o.x, o.y, o.z, r.x, r.y, r.z)
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Errors parsing a location string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("invalid number in location: '{0}'")]
    InvalidNumber(String),

    #[error("location takes at most 6 values, got {0}")]
    TooManyValues(usize),
}

/// Fully resolved model attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub offset: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for ModelDescriptor {
    fn default() -> Self {
        Self {
            url: None,
            offset: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl ModelDescriptor {
    /// Overlay the fields `spec` declares, leaving the rest untouched
    pub fn apply(&mut self, spec: &ModelSpec) {
        if let Some(url) = &spec.url {
            self.url = Some(url.clone());
        }
        if let Some(offset) = spec.offset {
            self.offset = offset;
        }
        if let Some(rotation) = spec.rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = spec.scale {
            self.scale = scale;
        }
    }
}

/// Row-major 3x3 rotation matrix
#[derive(Debug, Clone, Copy)]
struct Mat3([[f64; 3]; 3]);

impl Mat3 {
    /// XYZ Euler angles in degrees, applied as `Rx * Ry * Rz`
    fn from_euler_degrees(angles: Vec3) -> Self {
        let (sx, cx) = angles.x.to_radians().sin_cos();
        let (sy, cy) = angles.y.to_radians().sin_cos();
        let (sz, cz) = angles.z.to_radians().sin_cos();
        let rx = Self([[1.0, 0.0, 0.0], [0.0, cx, -sx], [0.0, sx, cx]]);
        let ry = Self([[cy, 0.0, sy], [0.0, 1.0, 0.0], [-sy, 0.0, cy]]);
        let rz = Self([[cz, -sz, 0.0], [sz, cz, 0.0], [0.0, 0.0, 1.0]]);
        rx.mul(&ry).mul(&rz)
    }

    fn mul(&self, other: &Self) -> Self {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.0[i][k] * other.0[k][j]).sum();
            }
        }
        Self(out)
    }

    fn mul_vec(&self, v: Vec3) -> Vec3 {
        let m = &self.0;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    fn to_euler_degrees(self) -> Vec3 {
        let m = &self.0;
        let y = m[0][2].clamp(-1.0, 1.0).asin();
        let (x, z) = if m[0][2].abs() < 0.999_999_9 {
            ((-m[1][2]).atan2(m[2][2]), (-m[0][1]).atan2(m[0][0]))
        } else {
            // gimbal lock: fold all roll into x
            (m[2][1].atan2(m[1][1]), 0.0)
        };
        Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }
}
