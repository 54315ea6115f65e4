//! IR version numbering.

/// The IR version this crate reads and writes.
pub const IR_VERSION: i64 = 1;

/// A version split into its parts; the wire number is
/// `major * 1000000 + minor * 10000 + bugfix`.
///
/// The convention is documentary: the codec never rejects a version number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IrVersion {
    pub major: u32,
    pub minor: u32,
    pub bugfix: u32,
}

impl IrVersion {
    pub fn new(major: u32, minor: u32, bugfix: u32) -> Self {
        Self {
            major,
            minor,
            bugfix,
        }
    }

    pub fn to_number(self) -> i64 {
        self.major as i64 * 1_000_000 + self.minor as i64 * 10_000 + self.bugfix as i64
    }

    /// Splits a wire version number.
    ///
    /// Returns None for negative numbers and for majors that overflow `u32`.
    pub fn from_number(n: i64) -> Option<Self> {
        if n < 0 {
            return None;
        }
        Some(Self {
            major: u32::try_from(n / 1_000_000).ok()?,
            minor: ((n / 10_000) % 100) as u32,
            bugfix: (n % 10_000) as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_number() {
        let v = IrVersion::new(1, 2, 3);
        assert_eq!(v.to_number(), 1_020_003);
        assert_eq!(IrVersion::from_number(1_020_003), Some(v));
        assert_eq!(IrVersion::from_number(IR_VERSION), Some(IrVersion::new(0, 0, 1)));
        assert_eq!(IrVersion::from_number(-5), None);
        assert_eq!(IrVersion::from_number(i64::MAX), None);
        assert_eq!(
            IrVersion::from_number(u32::MAX as i64 * 1_000_000),
            Some(IrVersion::new(u32::MAX, 0, 0))
        );
    }
}
