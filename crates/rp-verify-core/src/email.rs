use crate::controller::EMAIL_KEY;
use rp_storage::ProgressStore;
use tracing::warn;

/// Syntactic email check used by the gate: one or more characters that
/// are neither whitespace nor `@`, an `@`, a domain head of the same
/// shape, a dot, and a non-whitespace tail.
pub fn is_valid_email(raw: &str) -> bool {
    let Some((local, rest)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    // Any dot split of the remainder may satisfy the pattern.
    rest.char_indices().any(|(i, c)| {
        if c != '.' {
            return false;
        }
        let head = &rest[..i];
        let tail = &rest[i + 1..];
        !head.is_empty()
            && !head.contains('@')
            && !head.chars().any(char::is_whitespace)
            && !tail.is_empty()
            && !tail.chars().any(char::is_whitespace)
    })
}

/// Previously collected address, if any. Decides whether the gate
/// renders at all.
pub fn remembered_email<P: ProgressStore>(store: &P) -> Option<String> {
    match store.get(EMAIL_KEY) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(err) => {
            warn!("contact email unavailable: {err}");
            None
        }
    }
}

/// Persist a gate submission. Returns `false` (gate stays unsatisfied)
/// only for an invalid address; a storage failure is logged and the
/// session proceeds without resumability.
pub fn remember_email<P: ProgressStore>(store: &P, email: &str) -> bool {
    let email = email.trim();
    if !is_valid_email(email) {
        return false;
    }
    if let Err(err) = store.set(EMAIL_KEY, email) {
        warn!("failed to persist contact email: {err}");
    }
    true
}
