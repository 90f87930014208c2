/// Turns an untrusted comment body into markup that is safe to embed.
pub trait BodyRenderer: Send + Sync {
    fn render(&self, raw: &str) -> String;
}

/// Escapes everything and keeps line breaks.
pub struct EscapedText;

impl BodyRenderer for EscapedText {
    fn render(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for ch in raw.chars() {
            match ch {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                '\n' => out.push_str("<br>"),
                '\r' => {}
                c => out.push(c),
            }
        }
        out
    }
}
