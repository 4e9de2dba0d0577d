use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;

/// CSS color keywords accepted as fill and background colors.
pub static NAMED_COLORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque",
        "black", "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue",
        "chartreuse", "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "cyan",
        "darkblue", "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey",
        "darkkhaki", "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred",
        "darksalmon", "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey",
        "darkturquoise", "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey",
        "dodgerblue", "firebrick", "floralwhite", "forestgreen", "fuchsia", "gainsboro",
        "ghostwhite", "gold", "goldenrod", "gray", "green", "greenyellow", "grey", "honeydew",
        "hotpink", "indianred", "indigo", "ivory", "khaki", "lavender", "lavenderblush",
        "lawngreen", "lemonchiffon", "lightblue", "lightcoral", "lightcyan",
        "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey", "lightpink",
        "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray", "lightslategrey",
        "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta", "maroon",
        "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple", "mediumseagreen",
        "mediumslateblue", "mediumspringgreen", "mediumturquoise", "mediumvioletred",
        "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite", "navy",
        "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
        "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru",
        "pink", "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown",
        "royalblue", "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna",
        "silver", "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen",
        "steelblue", "tan", "teal", "thistle", "tomato", "transparent", "turquoise", "violet",
        "wheat", "white", "whitesmoke", "yellow", "yellowgreen",
    ]
    .into_iter()
    .collect()
});

pub fn is_named_color(name: &str) -> bool {
    NAMED_COLORS.contains(name)
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => {
            (digits.len() == 3 || digits.len() == 6)
                && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// A fill or background color accepted by the symbol renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Color {
    Named(String),
    Hex(String),
    Rgb(u8, u8, u8),
}

impl Color {
    pub fn black() -> Self {
        Self::Named("black".to_string())
    }

    pub fn white() -> Self {
        Self::Named("white".to_string())
    }

    /// Named colors are case-insensitive; `None` when `value` is neither a keyword nor hex.
    pub fn from_name(value: &str) -> Option<Self> {
        let value = value.trim();
        if is_hex_color(value) {
            return Some(Self::Hex(value.to_ascii_lowercase()));
        }
        let name = value.to_ascii_lowercase();
        is_named_color(&name).then_some(Self::Named(name))
    }

    /// Paint value for an SVG `fill` attribute.
    pub fn to_svg(&self) -> String {
        match self {
            Self::Named(name) | Self::Hex(name) => name.clone(),
            Self::Rgb(r, g, b) => format!("rgb({r},{g},{b})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(Color::from_name("Black"), Some(Color::black()));
        assert_eq!(Color::from_name("rebeccapurple").unwrap().to_svg(), "rebeccapurple");
        assert_eq!(Color::from_name("blurple"), None);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(Color::from_name("#FFF"), Some(Color::Hex("#fff".to_string())));
        assert!(is_hex_color("#0f172a"));
        assert!(!is_hex_color("#0f172"));
        assert!(!is_hex_color("0f172a"));
        assert!(!is_hex_color("#ggg"));
    }

    #[test]
    fn rgb_paint() {
        assert_eq!(Color::Rgb(255, 0, 10).to_svg(), "rgb(255,0,10)");
    }
}
