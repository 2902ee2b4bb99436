const APPENDIX_KEYWORD: &str = "appendix";

/// One TOC line cut into its raw section, title and page tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitLine {
    pub section: String,
    pub title: String,
    pub page: String,
}

impl SplitLine {
    /// Joins the three tokens back into a single line of text.
    pub fn to_text(&self) -> String {
        collapse_whitespace(&format!("{} {} {}", self.section, self.title, self.page))
    }
}

/// Splits a line into `(section, title, page)`.
///
/// The first token is the section number, except that `Appendix <label>` is
/// kept together as a two-token section. The last remaining token is the page
/// number and whatever is left in between is the title. Nothing is validated.
pub fn split_line(line: &str) -> SplitLine {
    let (head, mut rest) = split_first_token(line.trim());
    let section = if head.eq_ignore_ascii_case(APPENDIX_KEYWORD) {
        let (label, remainder) = split_first_token(rest);
        rest = remainder;
        format!("Appendix {label}")
    } else {
        head.to_string()
    };

    let (title, page) = match rest.rsplit_once(char::is_whitespace) {
        Some((title, page)) => (title.trim_end(), page),
        None => ("", rest),
    };

    SplitLine {
        section,
        title: collapse_whitespace(title),
        page: page.to_string(),
    }
}

fn split_first_token(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim_start()),
        None => (text, ""),
    }
}

/// Returns true when `token` looks like a section or page number.
///
/// Plain tokens must be dot-separated digit runs (a single trailing dot is
/// tolerated). Tokens starting with `Appendix ` may also use single letters
/// for any component.
pub fn is_numeric(token: &str) -> bool {
    if let Some(label) = strip_appendix_prefix(token) {
        return !label.is_empty()
            && label
                .split('.')
                .all(|part| is_integer(part) || letter_ordinal(part).is_some());
    }

    let trimmed = token.strip_suffix('.').unwrap_or(token);
    !trimmed.is_empty() && trimmed.split('.').all(is_integer)
}

pub fn is_integer(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|byte| byte.is_ascii_digit())
}

/// Maps a single ASCII letter to its 1-based alphabet position.
pub fn letter_ordinal(token: &str) -> Option<u32> {
    let mut chars = token.chars();
    let letter = chars.next()?;
    if chars.next().is_some() || !letter.is_ascii_alphabetic() {
        return None;
    }
    Some(u32::from(letter.to_ascii_uppercase() as u8 - b'A') + 1)
}

/// Returns the label after a case-insensitive `Appendix ` prefix.
pub fn strip_appendix_prefix(token: &str) -> Option<&str> {
    let prefix_len = APPENDIX_KEYWORD.len() + 1;
    let prefix = token.get(..prefix_len)?.as_bytes();
    if prefix[..APPENDIX_KEYWORD.len()].eq_ignore_ascii_case(APPENDIX_KEYWORD.as_bytes())
        && prefix[APPENDIX_KEYWORD.len()] == b' '
    {
        Some(token[prefix_len..].trim())
    } else {
        None
    }
}

pub fn strip_nonnumeric(text: &str, leading: bool, trailing: bool) -> &str {
    let not_digit = |ch: char| !ch.is_ascii_digit();
    let text = if leading {
        text.trim_start_matches(not_digit)
    } else {
        text
    };
    if trailing {
        text.trim_end_matches(not_digit)
    } else {
        text
    }
}

pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}
