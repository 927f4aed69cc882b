/// Normalize a postal code to the five-digit form used by zip-area ids.
///
/// Hyphenated and unhyphenated ZIP+4 codes keep their first five digits.
/// Codes that lost their leading zeros to numeric parsing (`2134`, or
/// `2134.0` from a float column) are padded back to five digits. Anything
/// else is trimmed and returned unchanged, so it simply fails to match.
/// Returns None for a blank code.
pub fn normalize_zip(code: &str) -> Option<String> {
    let code = code.trim();
    let code = code.strip_suffix(".0").unwrap_or(code);
    let base = code.split('-').next().unwrap_or(code).trim();
    if base.is_empty() { return None }

    if !base.bytes().all(|b| b.is_ascii_digit()) { return Some(base.to_string()) }
    Some(match base.len() {
        1..=4 => format!("{base:0>5}"),
        9 => base[..5].to_string(),
        _ => base.to_string(),
    })
}
