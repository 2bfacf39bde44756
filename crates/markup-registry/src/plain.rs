//! Plain-text rendering: escaping, autolinking and paragraph markup.
//!
//! [`render_plain`] escapes the input, turns bare URLs and e-mail addresses
//! into anchors, then wraps blank-line separated blocks in `<p>` and single
//! newlines in `<br>`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::RenderError;

/// Two or more newlines separate paragraphs.
static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").unwrap());

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").unwrap());

static SCHEME_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://\[?\w").unwrap());

static BARE_DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:www\.|\w[^@]+\.(?:com|edu|gov|int|mil|net|org)(?:$|/.*$))").unwrap()
});

static ENTITY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#?\w+;$").unwrap());

/// Escaped wrappers that may precede a link.
const LEADING_WRAPPERS: &[&str] = &["(", "[", "&lt;", "&quot;", "&#x27;"];

/// Escaped wrappers that may follow a link.
const TRAILING_WRAPPERS: &[&str] = &["&gt;", "&quot;", "&#x27;"];

/// Sentence punctuation never included at the end of a link.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ':', ';', '!'];

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Convert newlines into paragraph and line-break markup.
///
/// Blocks separated by two or more newlines become `<p>` elements joined by a
/// blank line; remaining single newlines become `<br>`. `\r\n` and `\r` are
/// normalized to `\n` first.
#[must_use]
pub fn linebreaks(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    PARAGRAPH_BREAK_RE
        .split(&normalized)
        .map(|para| format!("<p>{}</p>", para.replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Wrap URLs and e-mail addresses in anchors.
///
/// Expects HTML-escaped input: link targets are copied into `href` verbatim.
/// Recognizes `http(s)://` URLs, `www.` hosts and bare domains under common
/// top-level domains (linked with an `http://` prefix), and e-mail addresses.
///
/// Trailing sentence punctuation stays outside the anchor. A word that starts
/// with anything other than a bracket or escaped quote (for example a `.`)
/// is never linked.
///
/// # Examples
///
/// ```
/// use markup_registry::urlize;
///
/// assert_eq!(
///     urlize("see http://example.com."),
///     r#"see <a href="http://example.com">http://example.com</a>."#
/// );
/// assert_eq!(urlize(".http://example.com"), ".http://example.com");
/// ```
#[must_use]
pub fn urlize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for word in WORD_RE.find_iter(text) {
        out.push_str(&text[last..word.start()]);
        urlize_word(word.as_str(), &mut out);
        last = word.end();
    }
    out.push_str(&text[last..]);
    out
}

/// Render plain text as HTML.
///
/// # Errors
///
/// Never fails; the signature matches the [`Renderer`](crate::Renderer) contract.
pub fn render_plain(text: &str) -> Result<String, RenderError> {
    Ok(linebreaks(&urlize(&escape_html(text))))
}

fn urlize_word(word: &str, out: &mut String) {
    if !word.contains(['.', '@', ':']) {
        out.push_str(word);
        return;
    }

    let (lead, middle, trail) = trim_punctuation(word);
    match link_target(middle) {
        Some(href) => {
            out.push_str(lead);
            out.push_str(r#"<a href=""#);
            out.push_str(&href);
            out.push_str(r#"">"#);
            out.push_str(middle);
            out.push_str("</a>");
            out.push_str(trail);
        }
        None => out.push_str(word),
    }
}

/// Link target for a trimmed word, if it looks like a URL or e-mail address.
fn link_target(middle: &str) -> Option<String> {
    if SCHEME_URL_RE.is_match(middle) {
        return Some(middle.to_owned());
    }
    if !starts_with_ignore_case(middle, "http") && BARE_DOMAIN_RE.is_match(middle) {
        return Some(format!("http://{middle}"));
    }
    if !middle.contains(':') && is_email(middle) {
        return Some(format!("mailto:{middle}"));
    }
    None
}

/// Split a word into leading wrappers, the candidate link, and trailing
/// wrappers/punctuation.
fn trim_punctuation(word: &str) -> (&str, &str, &str) {
    let mut start = 0;
    let mut end = word.len();

    loop {
        let middle = &word[start..end];
        if let Some(opener) = LEADING_WRAPPERS.iter().find(|w| middle.starts_with(**w)) {
            start += opener.len();
            continue;
        }
        if let Some(closer) = TRAILING_WRAPPERS.iter().find(|w| middle.ends_with(**w)) {
            end -= closer.len();
            continue;
        }
        if let Some(closer) = unbalanced_closer(middle) {
            end -= closer.len_utf8();
            continue;
        }
        if middle.ends_with(TRAILING_PUNCTUATION) && !ENTITY_SUFFIX_RE.is_match(middle) {
            end -= 1;
            continue;
        }
        break;
    }

    (&word[..start], &word[start..end], &word[end..])
}

/// Closing bracket at the end of `middle` that has no opening partner inside it.
fn unbalanced_closer(middle: &str) -> Option<char> {
    [('(', ')'), ('[', ']')]
        .into_iter()
        .find(|&(open, close)| {
            middle.ends_with(close) && middle.matches(close).count() > middle.matches(open).count()
        })
        .map(|(_, close)| close)
}

fn is_email(candidate: &str) -> bool {
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-')
    })
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn plain(text: &str) -> String {
        render_plain(text).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_linebreaks_paragraphs() {
        assert_eq!(linebreaks("one\n\ntwo"), "<p>one</p>\n\n<p>two</p>");
        assert_eq!(linebreaks("one\n\n\n\ntwo"), "<p>one</p>\n\n<p>two</p>");
    }

    #[test]
    fn test_linebreaks_single_newline() {
        assert_eq!(linebreaks("line one\nline two"), "<p>line one<br>line two</p>");
    }

    #[test]
    fn test_linebreaks_normalizes_carriage_returns() {
        assert_eq!(linebreaks("a\r\n\r\nb\rc"), "<p>a</p>\n\n<p>b<br>c</p>");
    }

    #[test]
    fn test_linebreaks_empty() {
        assert_eq!(linebreaks(""), "<p></p>");
    }

    #[test]
    fn test_plain_urlize_leading_url() {
        assert_eq!(
            plain("http://example.com some text"),
            r#"<p><a href="http://example.com">http://example.com</a> some text</p>"#
        );
    }

    #[test]
    fn test_plain_urlize_middle_url() {
        assert_eq!(
            plain("Some http://example.com text"),
            r#"<p>Some <a href="http://example.com">http://example.com</a> text</p>"#
        );
    }

    #[test]
    fn test_plain_urlize_trailing_url() {
        assert_eq!(
            plain("Some text http://example.com"),
            r#"<p>Some text <a href="http://example.com">http://example.com</a></p>"#
        );
    }

    #[test]
    fn test_plain_urlize_period_after_url_excluded() {
        assert_eq!(
            plain("http://example.com. some text"),
            r#"<p><a href="http://example.com">http://example.com</a>. some text</p>"#
        );
        assert_eq!(
            plain("Some http://example.com. text"),
            r#"<p>Some <a href="http://example.com">http://example.com</a>. text</p>"#
        );
        assert_eq!(
            plain("Some text http://example.com."),
            r#"<p>Some text <a href="http://example.com">http://example.com</a>.</p>"#
        );
    }

    #[test]
    fn test_plain_urlize_leading_period_disqualifies() {
        assert_eq!(
            plain(".http://example.com some text"),
            "<p>.http://example.com some text</p>"
        );
        assert_eq!(
            plain("Some .http://example.com text"),
            "<p>Some .http://example.com text</p>"
        );
        assert_eq!(
            plain("Some text .http://example.com"),
            "<p>Some text .http://example.com</p>"
        );
    }

    #[test]
    fn test_plain_escapes_markup() {
        assert_eq!(
            plain("<span style=\"color: red\">plain</span> post\n\nhttp://example.com"),
            "<p>&lt;span style=&quot;color: red&quot;&gt;plain&lt;/span&gt; post</p>\n\n\
             <p><a href=\"http://example.com\">http://example.com</a></p>"
        );
    }

    #[test]
    fn test_urlize_www_host() {
        assert_eq!(
            urlize("visit www.example.org today"),
            r#"visit <a href="http://www.example.org">www.example.org</a> today"#
        );
    }

    #[test]
    fn test_urlize_bare_domain() {
        assert_eq!(
            urlize("example.com/docs"),
            r#"<a href="http://example.com/docs">example.com/docs</a>"#
        );
        assert_eq!(urlize("example.io"), "example.io");
    }

    #[test]
    fn test_urlize_email() {
        assert_eq!(
            urlize("mail ops@example.com,"),
            r#"mail <a href="mailto:ops@example.com">ops@example.com</a>,"#
        );
        assert_eq!(urlize("user@localhost"), "user@localhost");
    }

    #[test]
    fn test_urlize_parenthesized() {
        assert_eq!(
            urlize("(see https://example.com/a_(b))"),
            r#"(see <a href="https://example.com/a_(b)">https://example.com/a_(b)</a>)"#
        );
    }

    #[test]
    fn test_urlize_escaped_angle_brackets() {
        assert_eq!(
            urlize("&lt;https://example.com&gt;"),
            r#"&lt;<a href="https://example.com">https://example.com</a>&gt;"#
        );
    }

    #[test]
    fn test_urlize_keeps_query_entities() {
        assert_eq!(
            urlize("http://example.com/?a=1&amp;b=2"),
            r#"<a href="http://example.com/?a=1&amp;b=2">http://example.com/?a=1&amp;b=2</a>"#
        );
    }

    #[test]
    fn test_urlize_preserves_whitespace() {
        assert_eq!(urlize("a  \t b"), "a  \t b");
    }

    #[test]
    fn test_urlize_ignores_scheme_only() {
        assert_eq!(urlize("http://"), "http://");
        assert_eq!(urlize("note: fine."), "note: fine.");
    }
}
