//! Intruder profiles: the fixed three-evidence signatures guards try to infer.

use std::fmt;

use crate::evidence::{Evidence, EvidenceMask};

/// An intruder archetype, identified by the three evidence kinds it leaves.
///
/// Variants are listed in enumeration order; [`Profile::guess`] returns the
/// first match in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Profile {
    /// RFID spoof, camera blackout, forced lock.
    Insider,
    /// Glass vibration, motion trigger, tool marks.
    SmashAndGrab,
    /// Camera blackout, laser trip, RFID spoof.
    TechSpecialist,
    /// Forced lock, tool marks, laser trip.
    Lockpicker,
    /// Laser trip, motion trigger, camera blackout.
    Acrobat,
    /// Glass vibration, tool marks, camera blackout.
    Vandal,
    /// RFID spoof, motion trigger, glass vibration.
    ConArtist,
    /// Forced lock, RFID spoof, tool marks.
    Pro,
    /// Motion trigger, forced lock, glass vibration.
    Opportunist,
    /// Camera blackout, motion trigger, RFID spoof.
    NightCrawler,
    /// Tool marks, glass vibration, laser trip.
    Cutter,
    /// Camera blackout, laser trip, tool marks.
    GhostEntry,
}

impl Profile {
    /// Every profile, in enumeration order.
    pub const ALL: [Profile; 12] = [
        Profile::Insider,
        Profile::SmashAndGrab,
        Profile::TechSpecialist,
        Profile::Lockpicker,
        Profile::Acrobat,
        Profile::Vandal,
        Profile::ConArtist,
        Profile::Pro,
        Profile::Opportunist,
        Profile::NightCrawler,
        Profile::Cutter,
        Profile::GhostEntry,
    ];

    /// The three evidence kinds this profile drops.
    pub const fn signature(self) -> EvidenceMask {
        use Evidence::*;
        match self {
            Profile::Insider => EvidenceMask::of(&[RfidSpoof, CameraBlackout, ForcedLock]),
            Profile::SmashAndGrab => EvidenceMask::of(&[GlassVibration, MotionTrigger, ToolMarks]),
            Profile::TechSpecialist => EvidenceMask::of(&[CameraBlackout, LaserTrip, RfidSpoof]),
            Profile::Lockpicker => EvidenceMask::of(&[ForcedLock, ToolMarks, LaserTrip]),
            Profile::Acrobat => EvidenceMask::of(&[LaserTrip, MotionTrigger, CameraBlackout]),
            Profile::Vandal => EvidenceMask::of(&[GlassVibration, ToolMarks, CameraBlackout]),
            Profile::ConArtist => EvidenceMask::of(&[RfidSpoof, MotionTrigger, GlassVibration]),
            Profile::Pro => EvidenceMask::of(&[ForcedLock, RfidSpoof, ToolMarks]),
            Profile::Opportunist => EvidenceMask::of(&[MotionTrigger, ForcedLock, GlassVibration]),
            Profile::NightCrawler => EvidenceMask::of(&[CameraBlackout, MotionTrigger, RfidSpoof]),
            Profile::Cutter => EvidenceMask::of(&[ToolMarks, GlassVibration, LaserTrip]),
            Profile::GhostEntry => EvidenceMask::of(&[CameraBlackout, LaserTrip, ToolMarks]),
        }
    }

    /// Lowercase label used in records and reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            Profile::Insider => "insider",
            Profile::SmashAndGrab => "smash_and_grab",
            Profile::TechSpecialist => "tech_specialist",
            Profile::Lockpicker => "lockpicker",
            Profile::Acrobat => "acrobat",
            Profile::Vandal => "vandal",
            Profile::ConArtist => "con_artist",
            Profile::Pro => "pro",
            Profile::Opportunist => "opportunist",
            Profile::NightCrawler => "night_crawler",
            Profile::Cutter => "cutter",
            Profile::GhostEntry => "ghost_entry",
        }
    }

    /// The profile whose signature is exactly `mask`, if any.
    pub fn matching(mask: EvidenceMask) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.signature() == mask)
    }

    /// Whether `mask` is exactly some profile's signature.
    pub fn is_signature(mask: EvidenceMask) -> bool {
        Self::matching(mask).is_some()
    }

    /// First profile, in enumeration order, whose signature is contained in
    /// `collected`.
    pub fn guess(collected: EvidenceMask) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.signature().is_subset(collected))
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
