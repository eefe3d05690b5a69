//! Row cap policy: reconcile a requested `limit` with the server ceiling.

/// Resolve the effective row cap.
///
/// `ceiling <= 0` means the server imposes no ceiling. A requested limit is
/// honored only when it parses as a positive integer and, with a ceiling
/// configured, is strictly below it. Returns `None` for "no `LIMIT` clause".
pub fn resolve_limit(requested: Option<&str>, ceiling: i64) -> Option<u64> {
    let requested = requested
        .and_then(|r| r.parse::<i64>().ok())
        .filter(|n| *n > 0);

    if ceiling > 0 {
        match requested {
            Some(n) if n < ceiling => Some(n as u64),
            _ => Some(ceiling as u64),
        }
    } else {
        requested.map(|n| n as u64)
    }
}
