/// Build the printable label page.
///
/// `title`, `upper` and `lower` must already be escaped; `image` is inserted as markup.
pub fn generate_label_html(title: &str, upper: &str, image: &str, lower: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{}</title>
    <style>
        body {{
            margin: 0;
        }}
        #label {{
            width: 2in;
            margin: 0 auto;
            text-align: center;
            font-family: sans-serif;
            font-size: 10pt;
        }}
        #label svg {{
            width: 100%;
            height: auto;
        }}
    </style>
</head>
<body>
    <div id="label">
        <div class="caption upper">{}</div>
        {}
        <div class="caption lower">{}</div>
    </div>
</body>
</html>"#,
        title, upper, image, lower
    )
}
