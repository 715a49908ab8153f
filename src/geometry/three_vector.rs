//! Defines a spatial 3-vector: (x, y, z)

/// A three-vector, used for positions, normalized momenta and
/// field samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThreeVector {
    x: f64,
    y: f64,
    z: f64,
}

impl ThreeVector {
    /// Creates a new three-vector with the specified components.
    pub fn new(x: f64, y: f64, z: f64) -> ThreeVector {
        ThreeVector {x, y, z}
    }

    /// The null vector.
    pub fn zero() -> ThreeVector {
        ThreeVector {x: 0.0, y: 0.0, z: 0.0}
    }

    /// Returns the cross product of two three-vectors.
    pub fn cross(self, other: ThreeVector) -> ThreeVector {
        ThreeVector {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Returns the squared magnitude of the three-vector.
    pub fn norm_sqr(self) -> f64 {
        self * self
    }

    /// Returns the magnitude of the three-vector.
    pub fn norm(self) -> f64 {
        self.norm_sqr().sqrt()
    }

    /// Returns a new three-vector which has the same direction,
    /// but unit magnitude.
    ///
    /// # Panics
    /// If `self` does not have positive definite norm.
    pub fn normalize(self) -> Self {
        let mag = self.norm();
        assert!(mag > 0.0);
        self / mag
    }

    /// Copies the first `n` components into a new vector, zeroing
    /// the remainder. Used to respect the dimensionality of the
    /// simulation when copying positions.
    pub fn truncate(self, n: usize) -> Self {
        match n {
            0 => ThreeVector::zero(),
            1 => ThreeVector::new(self.x, 0.0, 0.0),
            2 => ThreeVector::new(self.x, self.y, 0.0),
            _ => self,
        }
    }
}

impl std::ops::Index<usize> for ThreeVector {
    type Output = f64;
    fn index(&self, index: usize) -> &Self::Output {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("index out of bounds: a three vector has 3 components but the index is {}", index)
        }
    }
}

impl std::ops::IndexMut<usize> for ThreeVector {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("index out of bounds: a three vector has 3 components but the index is {}", index)
        }
    }
}

impl std::fmt::Display for ThreeVector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:.6e}\t{:.6e}\t{:.6e}", self.x, self.y, self.z)
    }
}

impl std::ops::Add for ThreeVector {
    type Output = ThreeVector;
    fn add(self, other: ThreeVector) -> ThreeVector {
        ThreeVector {x: self.x + other.x, y: self.y + other.y, z: self.z + other.z}
    }
}

impl std::ops::Sub for ThreeVector {
    type Output = ThreeVector;
    fn sub(self, other: ThreeVector) -> ThreeVector {
        ThreeVector {x: self.x - other.x, y: self.y - other.y, z: self.z - other.z}
    }
}

impl std::ops::SubAssign for ThreeVector {
    fn sub_assign(&mut self, other: ThreeVector) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

/// Dot product
impl std::ops::Mul for ThreeVector {
    type Output = f64;
    fn mul(self, other: ThreeVector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl std::ops::Mul<f64> for ThreeVector {
    type Output = ThreeVector;
    fn mul(self, other: f64) -> ThreeVector {
        ThreeVector{x: self.x * other, y: self.y * other, z: self.z * other}
    }
}

impl std::ops::Mul<ThreeVector> for f64 {
    type Output = ThreeVector;
    fn mul(self, other: ThreeVector) -> ThreeVector {
        ThreeVector{x: self * other.x, y: self * other.y, z: self * other.z}
    }
}

impl std::ops::Neg for ThreeVector {
    type Output = ThreeVector;
    fn neg(self) -> ThreeVector {
        -1.0 * self
    }
}

impl std::ops::Div<f64> for ThreeVector {
    type Output = ThreeVector;
    fn div(self, other: f64) -> ThreeVector {
        ThreeVector{x: self.x / other, y: self.y / other, z: self.z / other}
    }
}

impl std::convert::From<[f64; 3]> for ThreeVector {
    fn from(item: [f64; 3]) -> Self {
        ThreeVector::new(item[0], item[1], item[2])
    }
}

impl std::convert::From<ThreeVector> for [f64; 3] {
    fn from(v: ThreeVector) -> Self {
        [v.x, v.y, v.z]
    }
}
