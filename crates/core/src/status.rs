//! Status enums and the employee status machine.
//!
//! Statuses are stored as lowercase text in the database and travel as the
//! same lowercase strings over JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum length (in characters) of a resignation reason.
pub const MAX_RESIGNATION_REASON_LEN: usize = 1000;

/// Reason recorded by the deprecated employee delete path.
pub const LEGACY_RESIGNATION_REASON: &str = "No resignation reason provided";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum!(
    /// Lifecycle of a member. All transitions are free.
    MemberStatus, "member status", {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
);

text_enum!(
    /// Lifecycle of an employee. `Resigned` is terminal.
    EmployeeStatus, "employee status", {
        Active => "active",
        Inactive => "inactive",
        Resigned => "resigned",
    }
);

text_enum!(
    /// Login account status.
    AccountStatus, "account status", {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
);

text_enum!(
    Gender, "gender", {
        Male => "male",
        Female => "female",
        Other => "other",
    }
);

/// Why an employee status change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("employee has already resigned")]
    AlreadyResigned,

    #[error("resignation must go through the resign operation")]
    ResignationRequiresReason,
}

impl EmployeeStatus {
    pub fn is_terminal(self) -> bool {
        self == EmployeeStatus::Resigned
    }

    /// Validate a status change made through a generic update.
    ///
    /// `active` and `inactive` move freely between each other. Nothing
    /// leaves `resigned`, and `resigned` can only be entered via resignation
    /// (which carries a reason and a date).
    pub fn check_update(self, to: EmployeeStatus) -> Result<(), TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::AlreadyResigned);
        }
        if to.is_terminal() {
            return Err(TransitionError::ResignationRequiresReason);
        }
        Ok(())
    }

    /// Validate that an employee in this status may resign.
    pub fn check_resign(self) -> Result<(), TransitionError> {
        if self.is_terminal() {
            Err(TransitionError::AlreadyResigned)
        } else {
            Ok(())
        }
    }
}

/// Validate a resignation reason: non-blank and at most
/// [`MAX_RESIGNATION_REASON_LEN`] characters.
pub fn validate_resignation_reason(reason: &str) -> Result<(), String> {
    if reason.trim().is_empty() {
        return Err("Resignation reason must not be empty".to_string());
    }
    if reason.chars().count() > MAX_RESIGNATION_REASON_LEN {
        return Err(format!(
            "Resignation reason must be at most {MAX_RESIGNATION_REASON_LEN} characters"
        ));
    }
    Ok(())
}
