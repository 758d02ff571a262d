use crate::giphy::Gif;

/// Render a GIF as an HTML fragment. Nothing is rendered without a GIF.
pub fn gif(gif: Option<&Gif>) -> String {
    let gif = match gif {
        Some(g) => g,
        None => return String::new(),
    };

    let title = escape(&gif.title);
    let dimensions = if gif.width > 0 && gif.height > 0 {
        format!(r#" width="{}" height="{}""#, gif.width, gif.height)
    } else {
        String::new()
    };

    format!(
        r#"<figure class="giphy-widget"><img src="{url}" alt="{title}"{dimensions} loading="lazy"><figcaption>{title}</figcaption></figure>"#,
        url = escape(&gif.url),
        title = title,
        dimensions = dimensions,
    )
}

/// Escape text for use in HTML content and quoted attributes
fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
