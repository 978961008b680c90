fn int_to_roman_upto_9(num: u8) -> Option<&'static str> {
    match num {
        1 => Some("I"),
        2 => Some("II"),
        3 => Some("III"),
        4 => Some("IV"),
        5 => Some("V"),
        6 => Some("VI"),
        7 => Some("VII"),
        8 => Some("VIII"),
        9 => Some("IX"),
        _ => None,
    }
}

/// Sequels are sometimes indexed with Roman numerals: "frozen 2" -> "frozen ii".
pub fn find_alternative_name(movie_name: &str) -> Option<String> {
    let (head, last) = movie_name.rsplit_once(' ')?;
    let sequel = last.parse::<u8>().ok().filter(|n| *n < 10)?;
    let roman = int_to_roman_upto_9(sequel)?;
    Some(format!("{head} {}", roman.to_lowercase()))
}
