//! Member lookup flags
//!
//! Every metadata query takes a `BindingFlags` value selecting which members
//! are visible: public and/or non-public, instance and/or static. The
//! reflection facade threads a single visibility choice through all of its
//! entry points (`PUBLIC` by default, `PUBLIC | NON_PUBLIC` to see hidden
//! representations) and ORs in `INSTANCE`/`STATIC` itself.

use std::fmt;
use std::ops::BitOr;

/// Member lookup flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingFlags(u8);

impl BindingFlags {
    /// Match nothing
    pub const NONE: Self = Self(0x00);
    /// Public members
    pub const PUBLIC: Self = Self(0x01);
    /// Non-public members
    pub const NON_PUBLIC: Self = Self(0x02);
    /// Instance members
    pub const INSTANCE: Self = Self(0x04);
    /// Static members
    pub const STATIC: Self = Self(0x08);

    /// PUBLIC | NON_PUBLIC
    pub const ANY_VISIBILITY: Self = Self(0x03);

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if all flags in `other` are set
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of flags
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether the caller opted into non-public members
    pub const fn includes_non_public(&self) -> bool {
        self.contains(Self::NON_PUBLIC)
    }

    /// Whether a member with the given visibility and storage class matches.
    ///
    /// A member matches when its visibility flag and its storage flag are both
    /// selected. Flags that name neither `INSTANCE` nor `STATIC` match no
    /// member, mirroring how hosts treat an incomplete binding request.
    pub fn matches(&self, is_public: bool, is_static: bool) -> bool {
        let visible = if is_public {
            self.contains(Self::PUBLIC)
        } else {
            self.contains(Self::NON_PUBLIC)
        };
        let storage = if is_static {
            self.contains(Self::STATIC)
        } else {
            self.contains(Self::INSTANCE)
        };
        visible && storage
    }

    /// Instance members with this visibility
    pub const fn instance(&self) -> Self {
        Self((self.0 & Self::ANY_VISIBILITY.0) | Self::INSTANCE.0)
    }

    /// Static members with this visibility
    pub const fn statics(&self) -> Self {
        Self((self.0 & Self::ANY_VISIBILITY.0) | Self::STATIC.0)
    }
}

impl Default for BindingFlags {
    fn default() -> Self {
        Self::PUBLIC
    }
}

impl BitOr for BindingFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for BindingFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::PUBLIC, "PUBLIC"),
            (Self::NON_PUBLIC, "NON_PUBLIC"),
            (Self::INSTANCE, "INSTANCE"),
            (Self::STATIC, "STATIC"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", set.join("|"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_public_only() {
        let flags = BindingFlags::default();
        assert!(flags.contains(BindingFlags::PUBLIC));
        assert!(!flags.includes_non_public());
    }

    #[test]
    fn test_matches_visibility_and_storage() {
        let flags = BindingFlags::PUBLIC.instance();
        assert!(flags.matches(true, false));
        assert!(!flags.matches(false, false));
        assert!(!flags.matches(true, true));

        let all = BindingFlags::ANY_VISIBILITY.statics();
        assert!(all.matches(false, true));
        assert!(all.matches(true, true));
        assert!(!all.matches(true, false));
    }

    #[test]
    fn test_instance_drops_static_bit() {
        let flags = (BindingFlags::PUBLIC | BindingFlags::STATIC).instance();
        assert_eq!(flags, BindingFlags::PUBLIC | BindingFlags::INSTANCE);
    }

    #[test]
    fn test_display() {
        assert_eq!(BindingFlags::NONE.to_string(), "NONE");
        assert_eq!(
            (BindingFlags::PUBLIC | BindingFlags::NON_PUBLIC).to_string(),
            "PUBLIC|NON_PUBLIC"
        );
    }
}
