//! Evidence kinds and the [`EvidenceMask`] byte set.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// One kind of tampering an intruder can leave behind.
///
/// Each kind occupies a single bit in an [`EvidenceMask`]. Guards carry a
/// device that detects exactly one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Evidence {
    /// A camera feed went dark.
    CameraBlackout = 1 << 0,
    /// A lock was forced.
    ForcedLock = 1 << 1,
    /// Display glass registered vibration.
    GlassVibration = 1 << 2,
    /// A badge reader saw a spoofed RFID tag.
    RfidSpoof = 1 << 3,
    /// A motion sensor tripped.
    MotionTrigger = 1 << 4,
    /// A laser grid was broken.
    LaserTrip = 1 << 5,
    /// Tool marks were left on a fixture.
    ToolMarks = 1 << 6,
}

impl Evidence {
    /// Every evidence kind, in bit order.
    pub const ALL: [Evidence; 7] = [
        Evidence::CameraBlackout,
        Evidence::ForcedLock,
        Evidence::GlassVibration,
        Evidence::RfidSpoof,
        Evidence::MotionTrigger,
        Evidence::LaserTrip,
        Evidence::ToolMarks,
    ];

    /// The single bit this kind occupies.
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Lowercase label used in records and reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Evidence::CameraBlackout => "camera_blackout",
            Evidence::ForcedLock => "forced_lock",
            Evidence::GlassVibration => "glass_vibration",
            Evidence::RfidSpoof => "rfid_spoof",
            Evidence::MotionTrigger => "motion_trigger",
            Evidence::LaserTrip => "laser_trip",
            Evidence::ToolMarks => "tool_marks",
        }
    }

    /// Look up a kind by its single-bit value.
    pub fn from_bit(bit: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.bit() == bit)
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`Evidence`] kinds packed into one byte.
///
/// Used for a room's physically present evidence, the case file's
/// collected evidence, and profile signatures. Bit 7 is never set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EvidenceMask(u8);

impl EvidenceMask {
    const VALID_BITS: u8 = 0x7f;

    /// The empty mask.
    pub const EMPTY: Self = Self(0);

    /// Build a mask from raw bits, discarding the unused high bit.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::VALID_BITS)
    }

    /// Build a mask from a list of kinds.
    pub const fn of(kinds: &[Evidence]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Raw bit pattern.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether `kind` is in the set.
    pub const fn contains(self, kind: Evidence) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Add `kind` to the set. Returns `true` if it was newly added.
    pub fn insert(&mut self, kind: Evidence) -> bool {
        let fresh = !self.contains(kind);
        self.0 |= kind.bit();
        fresh
    }

    /// Remove `kind` from the set. Returns `true` if it was present.
    pub fn remove(&mut self, kind: Evidence) -> bool {
        let present = self.contains(kind);
        self.0 &= !kind.bit();
        present
    }

    /// Whether every kind in `self` is also in `other`.
    pub const fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Returns `true` if no kinds are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of kinds in the set.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate over the kinds in the set, in bit order.
    pub fn iter(self) -> EvidenceMaskIter {
        EvidenceMaskIter { mask: self, next: 0 }
    }
}

impl From<Evidence> for EvidenceMask {
    fn from(kind: Evidence) -> Self {
        Self(kind.bit())
    }
}

impl BitOr for EvidenceMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EvidenceMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for EvidenceMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl FromIterator<Evidence> for EvidenceMask {
    fn from_iter<I: IntoIterator<Item = Evidence>>(iter: I) -> Self {
        let mut mask = Self::EMPTY;
        for kind in iter {
            mask.insert(kind);
        }
        mask
    }
}

impl IntoIterator for EvidenceMask {
    type Item = Evidence;
    type IntoIter = EvidenceMaskIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for EvidenceMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for kind in self.iter() {
            if !first {
                f.write_str("|")?;
            }
            f.write_str(kind.as_str())?;
            first = false;
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// Iterator over the kinds in an [`EvidenceMask`], yielding them in bit order.
pub struct EvidenceMaskIter {
    mask: EvidenceMask,
    next: usize,
}

impl Iterator for EvidenceMaskIter {
    type Item = Evidence;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < Evidence::ALL.len() {
            let kind = Evidence::ALL[self.next];
            self.next += 1;
            if self.mask.contains(kind) {
                return Some(kind);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bits_are_distinct_and_cover_low_seven() {
        let all: EvidenceMask = Evidence::ALL.into_iter().collect();
        assert_eq!(all.bits(), 0x7f);
        assert_eq!(all.len(), 7);
    }

    #[test]
    fn from_bit_round_trips_every_kind() {
        for kind in Evidence::ALL {
            assert_eq!(Evidence::from_bit(kind.bit()), Some(kind));
        }
        assert_eq!(Evidence::from_bit(0x80), None);
        assert_eq!(Evidence::from_bit(0x03), None);
    }

    #[test]
    fn insert_and_remove_report_change() {
        let mut mask = EvidenceMask::EMPTY;
        assert!(mask.insert(Evidence::LaserTrip));
        assert!(!mask.insert(Evidence::LaserTrip));
        assert!(mask.remove(Evidence::LaserTrip));
        assert!(!mask.remove(Evidence::LaserTrip));
        assert!(mask.is_empty());
    }

    #[test]
    fn from_bits_drops_high_bit() {
        assert_eq!(EvidenceMask::from_bits(0xff).bits(), 0x7f);
    }

    #[test]
    fn display_joins_labels() {
        let mask = EvidenceMask::of(&[Evidence::ToolMarks, Evidence::CameraBlackout]);
        assert_eq!(mask.to_string(), "camera_blackout|tool_marks");
        assert_eq!(EvidenceMask::EMPTY.to_string(), "none");
    }

    fn arb_mask() -> impl Strategy<Value = EvidenceMask> {
        any::<u8>().prop_map(EvidenceMask::from_bits)
    }

    proptest! {
        #[test]
        fn union_is_superset_of_both(a in arb_mask(), b in arb_mask()) {
            let u = a | b;
            prop_assert!(a.is_subset(u));
            prop_assert!(b.is_subset(u));
        }

        #[test]
        fn iter_yields_exactly_len_kinds(m in arb_mask()) {
            prop_assert_eq!(m.iter().count(), m.len());
            let rebuilt: EvidenceMask = m.iter().collect();
            prop_assert_eq!(rebuilt, m);
        }

        #[test]
        fn intersection_is_subset(a in arb_mask(), b in arb_mask()) {
            prop_assert!((a & b).is_subset(a));
            prop_assert!((a & b).is_subset(b));
        }
    }
}
