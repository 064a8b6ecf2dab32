//! Legacy chat formatting.
//!
//! Configured messages use `&` colour codes, `{#RRGGBB}` hex colours and literal `\n`
//! sequences. Everything is rewritten to the section-sign form understood by clients.

/// The section sign that introduces a formatting code.
pub const SECTION: char = '\u{a7}';

const CODES: &str = "0123456789AaBbCcDdEeFfKkLlMmNnOoRrXx";

/// Formats a configured message for display.
#[must_use]
pub fn format_message(message: &str) -> String {
    let message = message.replace("\\n", "\n");
    let message = apply_hex_colors(&message);
    colorize(&message)
}

/// Translates `&` colour codes into section-sign codes.
#[must_use]
pub fn colorize(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut chars = message.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '&'
            && let Some(&code) = chars.peek()
            && CODES.contains(code)
        {
            out.push(SECTION);
            out.push(code.to_ascii_lowercase());
            chars.next();
            continue;
        }
        out.push(ch);
    }
    out
}

/// Replaces `{#RRGGBB}` tokens with the `§x§R§R§G§G§B§B` sequence.
///
/// Malformed tokens are kept as written.
#[must_use]
pub fn apply_hex_colors(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;
    while let Some(start) = rest.find("{#") {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match parse_hex_token(candidate) {
            Some(hex) => {
                out.push(SECTION);
                out.push('x');
                for digit in hex.chars() {
                    out.push(SECTION);
                    out.push(digit.to_ascii_lowercase());
                }
                rest = &candidate[9..];
            }
            None => {
                out.push_str("{#");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn parse_hex_token(token: &str) -> Option<&str> {
    let hex = token.get(2..8)?;
    if token.get(8..9)? != "}" || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(hex)
}

/// Removes all section-sign formatting codes, for console output.
#[must_use]
pub fn strip_formatting(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut chars = message.chars();
    while let Some(ch) = chars.next() {
        if ch == SECTION {
            chars.next();
            continue;
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorize() {
        assert_eq!(colorize("&aHello &Lworld"), "\u{a7}aHello \u{a7}lworld");
        assert_eq!(colorize("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(colorize("&zunknown"), "&zunknown");
        assert_eq!(colorize("trailing &"), "trailing &");
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(
            apply_hex_colors("{#FFAA00}gold"),
            "\u{a7}x\u{a7}f\u{a7}f\u{a7}a\u{a7}a\u{a7}0\u{a7}0gold"
        );
        assert_eq!(apply_hex_colors("{#GGGGGG}bad"), "{#GGGGGG}bad");
        assert_eq!(apply_hex_colors("short {#FFF}"), "short {#FFF}");
    }

    #[test]
    fn test_format_message_newlines_and_strip() {
        let formatted = format_message("&eLine one\\n&7Line two");
        assert_eq!(formatted, "\u{a7}eLine one\n\u{a7}7Line two");
        assert_eq!(strip_formatting(&formatted), "Line one\nLine two");
    }
}
