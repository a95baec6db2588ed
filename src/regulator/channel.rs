//! Channel identifiers and direction mirroring.

/// Index of a regulated motor port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel(u8);

impl Channel {
    /// Port A.
    pub const A: Self = Self(0);
    /// Port B.
    pub const B: Self = Self(1);
    /// Port C.
    pub const C: Self = Self(2);

    /// Create a channel from a port index.
    #[inline]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Port index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Raw port number.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<u8> for Channel {
    fn from(index: u8) -> Self {
        Self(index)
    }
}

/// Orientation of a motor relative to the logical forward direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mirror {
    /// Encoder and power signs used as-is.
    #[default]
    Normal,
    /// Encoder and power signs flipped.
    Mirrored,
}

impl Mirror {
    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Mirror::Normal => 1,
            Mirror::Mirrored => -1,
        }
    }

    /// Map a raw encoder count into the logical direction.
    #[inline]
    pub fn count(self, raw: i32) -> i32 {
        raw.wrapping_mul(self.sign())
    }

    /// Map a logical power into the motor's direction.
    #[inline]
    pub fn power(self, power: i8) -> i8 {
        match self {
            Mirror::Normal => power,
            Mirror::Mirrored => -power,
        }
    }
}

impl From<bool> for Mirror {
    fn from(mirrored: bool) -> Self {
        if mirrored {
            Mirror::Mirrored
        } else {
            Mirror::Normal
        }
    }
}
