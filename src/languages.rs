/// Human-readable name for a language code, used in prompts and reports.
/// Returns an empty string for codes outside the table.
pub fn display_name(code: &str) -> &str {
    match code.trim().to_lowercase().as_str() {
        "en" => "English",
        "es" => "Spanish",
        "pt" => "Portuguese",
        "nl" => "Dutch",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "ja" => "Japanese",
        "zh" => "Chinese",
        "ru" => "Russian",
        "ar" => "Arabic",
        "ko" => "Korean",
        "pl" => "Polish",
        "tr" => "Turkish",
        "hi" => "Hindi",
        _ => "",
    }
}

/// `display_name` with the code as fallback, for codes outside the table.
pub fn display_name_or_code(code: &str) -> String {
    let name = display_name(code);
    if name.is_empty() {
        code.trim().to_lowercase()
    } else {
        name.to_string()
    }
}
