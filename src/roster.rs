//! The closed set of golfers a photo may pair with.

/// Display group of roster names. Grouping has no effect on validation.
#[derive(Debug, Clone, Copy)]
pub struct RosterGroup {
    /// Group label shown in pickers.
    pub label: &'static str,
    /// Names in the group.
    pub names: &'static [&'static str],
}

/// The roster, partitioned for display.
pub const ROSTER: &[RosterGroup] = &[
    RosterGroup {
        label: "Today's Favourites",
        names: &[
            "Scottie Scheffler",
            "Rory McIlroy",
            "Xander Schauffele",
            "Russell Henley",
            "Collin Morikawa",
        ],
    },
    RosterGroup {
        label: "Alternative Favourites",
        names: &[
            "Greg Norman",
            "Tiger Woods",
            "John Daly",
            "Phil Mickelson",
            "Bubba Watson",
            "Bryson DeChambeau",
        ],
    },
];

/// Whether `name` is on the roster. Exact, case-sensitive match.
#[must_use]
pub fn is_allowed(name: &str) -> bool {
    ROSTER.iter().any(|group| group.names.contains(&name))
}

/// Validate a subject name.
///
/// # Errors
///
/// Returns the rejected name if it is not on the roster.
pub fn validate_subject(name: &str) -> Result<(), String> {
    if is_allowed(name) {
        Ok(())
    } else {
        Err(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_groups_are_accepted() {
        assert!(is_allowed("Scottie Scheffler"));
        assert!(is_allowed("Greg Norman"));
        assert!(is_allowed("Bryson DeChambeau"));
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(!is_allowed("Unknown Person"));
        assert!(!is_allowed(""));
        assert_eq!(validate_subject("Unknown Person"), Err("Unknown Person".to_string()));
    }

    #[test]
    fn match_is_exact() {
        assert!(!is_allowed("greg norman"));
        assert!(!is_allowed(" Greg Norman"));
    }

    #[test]
    fn roster_has_two_groups() {
        assert_eq!(ROSTER.len(), 2);
        let total: usize = ROSTER.iter().map(|g| g.names.len()).sum();
        assert_eq!(total, 11);
    }
}
