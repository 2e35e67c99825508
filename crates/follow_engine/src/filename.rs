const KEEP_PUNCTUATION: &[char] = &['-', '_', '.', '(', ')', ' '];

/// Reduces `stem` to ASCII letters, digits and `-_.() `, trims it and turns
/// spaces into underscores. Windows device names get a trailing underscore.
pub fn safe_filename(stem: &str) -> String {
    let kept: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || KEEP_PUNCTUATION.contains(c))
        .collect();
    let mut name = kept.trim().replace(' ', "_");
    if is_reserved_windows_name(&name) {
        name.push('_');
    }
    name
}

/// `<safe(base)>_<timestamp>`, the shared stem of one run's export files.
pub fn export_stem(base: &str, timestamp: &str) -> String {
    safe_filename(&format!("{base}_{timestamp}"))
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
