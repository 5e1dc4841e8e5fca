//! End-of-run summary.

use std::fmt;

use heist_core::{ActorId, Evidence, EvidenceMask, Profile};
use heist_record::RecorderStats;

use crate::case_file::CaseSnapshot;
use crate::guard::ExitReason;

/// How one guard finished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardSummary {
    /// Display name.
    pub name: String,
    /// Numeric id.
    pub id: ActorId,
    /// `None` only if the run was aborted before the guard exited.
    pub exit_reason: Option<ExitReason>,
    /// Final boredom.
    pub boredom: u32,
    /// Final stress.
    pub stress: u32,
}

/// Who won.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// At least one guard left with [`ExitReason::FoundClues`].
    GuardsWin,
    /// No guard identified the intruder.
    IntruderWins,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::GuardsWin => f.write_str("Guards Win!"),
            Outcome::IntruderWins => f.write_str("Intruder Wins!"),
        }
    }
}

/// Everything the driver knows once every actor has been joined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per registered guard, in registration order.
    pub guards: Vec<GuardSummary>,
    /// Union of all collected evidence.
    pub collected: EvidenceMask,
    /// Whether the case file was solved.
    pub solved: bool,
    /// First profile whose signature is contained in `collected`, once the
    /// case is solved. `None` for an unsolved case.
    pub guess: Option<Profile>,
    /// The intruder's real profile.
    pub actual: Profile,
    /// Derived from the guards' exit reasons.
    pub outcome: Outcome,
    /// Recorder counters.
    pub records: RecorderStats,
}

impl RunReport {
    /// Assemble a report and derive the guess and outcome.
    pub fn new(
        guards: Vec<GuardSummary>,
        case: CaseSnapshot,
        actual: Profile,
        records: RecorderStats,
    ) -> Self {
        let winners = guards
            .iter()
            .filter(|g| g.exit_reason == Some(ExitReason::FoundClues))
            .count();
        Self {
            guards,
            collected: case.collected,
            solved: case.solved,
            guess: case.solved.then(|| Profile::guess(case.collected)).flatten(),
            actual,
            outcome: if winners == 0 {
                Outcome::IntruderWins
            } else {
                Outcome::GuardsWin
            },
            records,
        }
    }

    /// Guards that exited with [`ExitReason::FoundClues`].
    pub fn winners(&self) -> usize {
        self.guards
            .iter()
            .filter(|g| g.exit_reason == Some(ExitReason::FoundClues))
            .count()
    }
}

const RULE: &str = "================================================";

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "Heist Simulation Results:")?;
        writeln!(f, "{RULE}")?;
        for g in &self.guards {
            match g.exit_reason {
                Some(reason) => {
                    let mark = if reason == ExitReason::Overwhelmed { "✗" } else { " " };
                    writeln!(
                        f,
                        "[{mark}] Guard {} (ID {}) exited because of [{reason}] (bored={} stress={}).",
                        g.name, g.id, g.boredom, g.stress
                    )?;
                }
                None => writeln!(
                    f,
                    "[?] Guard {} (ID {}) was still on patrol (bored={} stress={}).",
                    g.name, g.id, g.boredom, g.stress
                )?,
            }
        }

        writeln!(f)?;
        writeln!(f, "Shared Case File Checklist:")?;
        for kind in Evidence::ALL {
            let mark = if self.collected.contains(kind) { "✓" } else { " " };
            writeln!(f, "  - [{mark}] {kind}")?;
        }

        writeln!(f)?;
        writeln!(f, "Victory Results:")?;
        writeln!(f, "----------------------------------------------------")?;
        writeln!(
            f,
            "- Guards exited after identifying the intruder: {}/{}",
            self.winners(),
            self.guards.len()
        )?;
        match self.guess {
            Some(p) => writeln!(f, "- Intruder Guess: {p}")?,
            None => writeln!(f, "- Intruder Guess: N/A")?,
        }
        writeln!(f, "- Actual Intruder Type: {}", self.actual)?;
        writeln!(f)?;
        write!(f, "Overall Result: {}", self.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case_file::CaseFile;

    fn summary(id: u32, reason: Option<ExitReason>) -> GuardSummary {
        GuardSummary {
            name: format!("g{id}"),
            id: ActorId(id),
            exit_reason: reason,
            boredom: 3,
            stress: 1,
        }
    }

    #[test]
    fn intruder_wins_without_found_clues() {
        let report = RunReport::new(
            vec![
                summary(1, Some(ExitReason::Bored)),
                summary(2, Some(ExitReason::Overwhelmed)),
            ],
            CaseSnapshot::default(),
            Profile::Pro,
            RecorderStats::default(),
        );
        assert_eq!(report.outcome, Outcome::IntruderWins);
        assert_eq!(report.guess, None);
        assert_eq!(report.winners(), 0);
    }

    #[test]
    fn zero_guards_is_an_intruder_win() {
        let report = RunReport::new(
            Vec::new(),
            CaseSnapshot::default(),
            Profile::Vandal,
            RecorderStats::default(),
        );
        assert_eq!(report.outcome, Outcome::IntruderWins);
    }

    #[test]
    fn one_found_clues_is_a_guard_win() {
        let case = CaseSnapshot {
            collected: Profile::Acrobat.signature(),
            solved: true,
        };
        let report = RunReport::new(
            vec![
                summary(1, Some(ExitReason::FoundClues)),
                summary(2, Some(ExitReason::Bored)),
            ],
            case,
            Profile::Acrobat,
            RecorderStats::default(),
        );
        assert_eq!(report.outcome, Outcome::GuardsWin);
        assert_eq!(report.guess, Some(Profile::Acrobat));
        assert_eq!(report.winners(), 1);
    }

    #[test]
    fn guess_is_first_subset_in_enumeration_order() {
        // Insider and TechSpecialist are both contained; Insider comes first.
        let collected = Profile::Insider.signature() | Profile::TechSpecialist.signature();
        let case = CaseSnapshot {
            collected,
            solved: true,
        };
        let report = RunReport::new(Vec::new(), case, Profile::TechSpecialist, RecorderStats::default());
        assert_eq!(report.guess, Some(Profile::Insider));
    }

    #[test]
    fn unsolved_case_makes_no_guess() {
        // Contains Lockpicker's signature but never equalled any signature.
        let file = CaseFile::new();
        for kind in [
            Evidence::ForcedLock,
            Evidence::ToolMarks,
            Evidence::CameraBlackout,
            Evidence::LaserTrip,
        ] {
            file.record(kind);
        }
        let case = file.snapshot();
        assert!(!case.solved);
        assert!(Profile::Lockpicker.signature().is_subset(case.collected));

        let report = RunReport::new(Vec::new(), case, Profile::Lockpicker, RecorderStats::default());
        assert_eq!(report.guess, None);
        assert!(report.to_string().contains("- Intruder Guess: N/A"));
    }

    #[test]
    fn display_renders_checklist_and_result() {
        let case = CaseSnapshot {
            collected: EvidenceMask::from(Evidence::ToolMarks),
            solved: false,
        };
        let report = RunReport::new(
            vec![summary(7, Some(ExitReason::Overwhelmed))],
            case,
            Profile::Pro,
            RecorderStats::default(),
        );
        let text = report.to_string();
        assert!(text.contains("[✗] Guard g7 (ID 7) exited because of [overwhelmed]"));
        assert!(text.contains("  - [✓] tool_marks"));
        assert!(text.contains("  - [ ] laser_trip"));
        assert!(text.contains("- Intruder Guess: N/A"));
        assert!(text.contains("- Actual Intruder Type: pro"));
        assert!(text.ends_with("Overall Result: Intruder Wins!"));
    }
}
