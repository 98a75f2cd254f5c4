/// Escape text for interpolation into HTML element bodies and attribute values.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::escape;

    #[test]
    fn escapes_special_chars() {
        assert_eq!(escape("<script>"), "&lt;script&gt;");
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("\"q\" 'x'"), "&quot;q&quot; &#x27;x&#x27;");
    }

    #[test]
    fn ampersand_is_escaped_first() {
        assert_eq!(escape("&lt;"), "&amp;lt;");
    }
}
