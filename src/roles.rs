//! Free-text role resolution.
//!
//! Members type role names by hand, so the requested name is matched against
//! the guild's live role list rather than looked up exactly. An exact
//! case-insensitive hit always wins with score `1.0`; otherwise every
//! candidate is scored with normalized Levenshtein similarity and the best one
//! is returned. No minimum score is applied here.

use crate::{Error, discord::Role};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleMatch<'a> {
    pub role: &'a Role,
    /// Similarity in `[0, 1]`; `1.0` means exact (case-insensitive).
    pub score: f64,
}

/// Similarity of two role names, ignoring case.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Pick the candidate closest to `free_text`. Ties go to the earliest candidate.
///
/// # Errors
/// Returns [`Error::NoCandidates`] if `candidates` is empty.
pub fn resolve<'a>(free_text: &str, candidates: &'a [Role]) -> Result<RoleMatch<'a>, Error> {
    let wanted = free_text.to_lowercase();

    if let Some(role) = candidates.iter().find(|r| r.name.to_lowercase() == wanted) {
        return Ok(RoleMatch { role, score: 1.0 });
    }

    let mut best: Option<RoleMatch<'a>> = None;
    for role in candidates {
        let score = similarity(&wanted, &role.name);
        if best.map_or(true, |b| score > b.score) {
            best = Some(RoleMatch { role, score });
        }
    }

    best.ok_or(Error::NoCandidates)
}
