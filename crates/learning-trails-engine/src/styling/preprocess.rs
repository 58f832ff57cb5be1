//! Rewrites playground literal and placeholder syntax inside code into
//! styleable tags before the XML is parsed.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Glyph standing in for a colour literal.
pub const COLOR_LITERAL_GLYPH: &str = "■";
/// Glyph standing in for an image literal.
pub const IMAGE_LITERAL_GLYPH: &str = "🏞";

static COLOR_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"#colorLiteral\(\s*red:\s*([0-9.]+)\s*,\s*green:\s*([0-9.]+)\s*,\s*blue:\s*([0-9.]+)\s*,\s*alpha:\s*([0-9.]+)\s*\)",
    )
    .expect("valid colour literal regex")
});

static IMAGE_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"#imageLiteral\(\s*resourceName:\s*(?:"|&quot;)(.*?)(?:"|&quot;)\s*\)"#)
        .expect("valid image literal regex")
});

// Authors write `<#name#>`, usually escaped as `&lt;#name#&gt;` in XML.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:<|&lt;)#(.+?)#(?:>|&gt;)").expect("valid placeholder regex")
});

static CODE_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(<code(?:\s[^>]*)?>)(.*?)(</code>)").expect("valid code regex"));

static NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").expect("valid newline regex"));

/// Whether a fragment contains a `<code>` element.
pub fn contains_code(xml: &str) -> bool {
    CODE_REGION.is_match(xml)
}

/// `#colorLiteral(red: r, green: g, blue: b, alpha: a)` →
/// `<literal color="r,g,b,a">■</literal>`
pub fn substitute_color_literals(xml: &str) -> String {
    COLOR_LITERAL
        .replace_all(xml, |caps: &Captures| {
            format!(
                "<literal color=\"{},{},{},{}\">{COLOR_LITERAL_GLYPH}</literal>",
                &caps[1], &caps[2], &caps[3], &caps[4]
            )
        })
        .into_owned()
}

/// `#imageLiteral(resourceName: "name")` → `<literal image="name">🏞</literal>`
pub fn substitute_image_literals(xml: &str) -> String {
    IMAGE_LITERAL
        .replace_all(xml, |caps: &Captures| {
            format!(
                "<literal image=\"{}\">{IMAGE_LITERAL_GLYPH}</literal>",
                &caps[1]
            )
        })
        .into_owned()
}

/// `<#symbol#>` → `<placeholder>symbol</placeholder>`
pub fn substitute_placeholders(xml: &str) -> String {
    PLACEHOLDER
        .replace_all(xml, "<placeholder>$1</placeholder>")
        .into_owned()
}

/// Replaces source newlines inside `<code>` regions with `<br/>` so each
/// source line becomes its own code paragraph.
pub fn break_code_lines(xml: &str) -> String {
    CODE_REGION
        .replace_all(xml, |caps: &Captures| {
            format!(
                "{}{}{}",
                &caps[1],
                NEWLINE.replace_all(&caps[2], "<br/>"),
                &caps[3]
            )
        })
        .into_owned()
}

/// Runs every rewrite in order.
pub fn preprocess_code(xml: &str) -> String {
    let xml = substitute_color_literals(xml);
    let xml = substitute_image_literals(&xml);
    let xml = substitute_placeholders(&xml);
    break_code_lines(&xml)
}
