//! Derivation of the URL slug that identifies a public profile page.
//!
//! A slug is the profile's full name, lowercased and stripped down to ASCII
//! alphanumerics. Uniqueness is enforced by the database; when a slug is
//! taken, callers probe `slug_candidate` with an increasing attempt counter
//! until a free one is found ("janedoe", "janedoe2", "janedoe3", ...).

/// Derives the base slug for a full name.
///
/// Falls back to `"user"` when the name contains no ASCII alphanumerics at
/// all (e.g. a name written entirely in a non-Latin script), so that a
/// profile never ends up with an empty URL segment.
pub fn slug_base(full_name: &str) -> String {
    let base: String = full_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    if base.is_empty() {
        "user".to_string()
    } else {
        base
    }
}

/// Returns the candidate slug for the given collision-resolution attempt.
///
/// Attempt 0 is the bare base; attempt N appends the suffix N+1, matching
/// the numbering users see on their profile URL.
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}{}", base, attempt + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_lowercases_and_strips_non_alphanumerics() {
        assert_eq!(slug_base("Jane Doe"), "janedoe");
        assert_eq!(slug_base("  Mary-Ann O'Neil  "), "maryannoneil");
        assert_eq!(slug_base("User123"), "user123");
    }

    #[test]
    fn base_falls_back_for_names_without_ascii() {
        assert_eq!(slug_base("山田太郎"), "user");
        assert_eq!(slug_base("---"), "user");
        assert_eq!(slug_base(""), "user");
    }

    #[test]
    fn candidates_number_from_two() {
        assert_eq!(slug_candidate("janedoe", 0), "janedoe");
        assert_eq!(slug_candidate("janedoe", 1), "janedoe2");
        assert_eq!(slug_candidate("janedoe", 2), "janedoe3");
    }
}
