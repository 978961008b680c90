/// Lowercase, turn `.` and `-` separators into spaces, trim the ends.
/// Runs of separators are kept as runs of spaces.
pub fn clean_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if matches!(c, '.' | '-') { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Split on every single space; empty tokens are left for callers to filter.
pub fn split_text(text: &str) -> Vec<String> {
    text.split(' ').map(str::to_string).collect()
}

pub fn to_title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
