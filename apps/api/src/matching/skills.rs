//! Skill Parser — turns a profile's free-text skills field into match tokens.

/// Splits a comma-separated skills string into trimmed, lowercase tokens.
///
/// Empty pieces are dropped and repeated tokens keep their first position,
/// so display order follows what the user typed. `None` and `""` both give
/// an empty list.
pub fn parse_skills(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let mut tokens: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let token = part.trim().to_lowercase();
        if token.is_empty() || tokens.contains(&token) {
            continue;
        }
        tokens.push(token);
    }
    tokens
}

/// Stable fingerprint of an ordered token list, used as a cache-key component.
/// Any edit that changes the parsed tokens changes the fingerprint.
pub fn skills_fingerprint(tokens: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    for token in tokens {
        hasher.update(token.as_bytes());
        // Separator byte cannot appear in a token: commas are split away.
        hasher.update(b",");
    }
    hasher.finalize().to_hex().as_str()[..16].to_string()
}
