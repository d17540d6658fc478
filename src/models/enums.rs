use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(ScanStatus {
    Uploaded => "uploaded",
    Processing => "processing",
    Done => "done",
    Failed => "failed",
    Updated => "updated",
    Saved => "saved",
});

impl ScanStatus {
    /// Transition table. Any operation whose current state is not in the
    /// matching `*_FROM` slice is rejected; there is no other way to move
    /// a scan between states.
    pub const ANALYZE_FROM: &'static [ScanStatus] = &[
        ScanStatus::Uploaded,
        ScanStatus::Done,
        ScanStatus::Failed,
        ScanStatus::Updated,
    ];
    pub const CORRECT_FROM: &'static [ScanStatus] =
        &[ScanStatus::Done, ScanStatus::Failed, ScanStatus::Updated];
    pub const SAVE_FROM: &'static [ScanStatus] = &[ScanStatus::Done, ScanStatus::Updated];

    pub fn can_start_analysis(&self) -> bool {
        Self::ANALYZE_FROM.contains(self)
    }

    pub fn can_correct(&self) -> bool {
        Self::CORRECT_FROM.contains(self)
    }

    /// `Saved` is terminal: a second save is rejected rather than re-running
    /// the commit, which would duplicate prescriptions.
    pub fn can_save(&self) -> bool {
        Self::SAVE_FROM.contains(self)
    }
}

str_enum!(IntakeStatus {
    Taken => "taken",
    Skipped => "skipped",
    Delayed => "delayed",
});

str_enum!(ActivityStatus {
    Done => "done",
    Skipped => "skipped",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn scan_status_round_trip() {
        for status in [
            ScanStatus::Uploaded,
            ScanStatus::Processing,
            ScanStatus::Done,
            ScanStatus::Failed,
            ScanStatus::Updated,
            ScanStatus::Saved,
        ] {
            let s = status.as_str();
            assert_eq!(ScanStatus::from_str(s).unwrap(), status);
        }
    }

    #[test]
    fn invalid_status_rejected() {
        let err = ScanStatus::from_str("does-not-exist");
        assert!(matches!(err, Err(DatabaseError::InvalidEnum { .. })));
    }

    #[test]
    fn intake_status_round_trip() {
        for status in [
            IntakeStatus::Taken,
            IntakeStatus::Skipped,
            IntakeStatus::Delayed,
        ] {
            assert_eq!(IntakeStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn activity_status_round_trip() {
        for status in [ActivityStatus::Done, ActivityStatus::Skipped] {
            assert_eq!(ActivityStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&IntakeStatus::Taken).unwrap();
        assert_eq!(json, "\"taken\"");
        let back: IntakeStatus = serde_json::from_str("\"delayed\"").unwrap();
        assert_eq!(back, IntakeStatus::Delayed);
    }

    #[test]
    fn analysis_allowed_from_every_settled_state() {
        assert!(ScanStatus::Uploaded.can_start_analysis());
        assert!(ScanStatus::Done.can_start_analysis());
        assert!(ScanStatus::Failed.can_start_analysis());
        assert!(ScanStatus::Updated.can_start_analysis());
        assert!(!ScanStatus::Processing.can_start_analysis());
        assert!(!ScanStatus::Saved.can_start_analysis());
    }

    #[test]
    fn correction_rejected_while_processing_or_saved() {
        assert!(ScanStatus::Done.can_correct());
        assert!(ScanStatus::Failed.can_correct());
        assert!(ScanStatus::Updated.can_correct());
        assert!(!ScanStatus::Uploaded.can_correct());
        assert!(!ScanStatus::Processing.can_correct());
        assert!(!ScanStatus::Saved.can_correct());
    }

    #[test]
    fn save_only_from_done_or_updated() {
        assert!(ScanStatus::Done.can_save());
        assert!(ScanStatus::Updated.can_save());
        assert!(!ScanStatus::Uploaded.can_save());
        assert!(!ScanStatus::Processing.can_save());
        assert!(!ScanStatus::Failed.can_save());
        assert!(!ScanStatus::Saved.can_save());
    }
}
