use tracing::Level;

use crate::core::params::RenderRequest;
use crate::core::{symbol, template};
use crate::error::QrLabelResult;

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";
pub const HTML_CONTENT_TYPE: &str = "text/html";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    /// The bare vector image.
    Image,
    /// An HTML page wrapping the image between two captions.
    Label,
}

impl DocumentKind {
    pub fn content_type(self) -> &'static str {
        match self {
            DocumentKind::Image => SVG_CONTENT_TYPE,
            DocumentKind::Label => HTML_CONTENT_TYPE,
        }
    }
}

/// A successfully rendered response body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDocument {
    pub kind: DocumentKind,
    pub body: String,
}

impl RenderedDocument {
    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }
}

/// Encode the text and serialize the resulting image.
///
/// Capacity failures are returned as-is; the level is never lowered and the text never
/// truncated to make the data fit.
pub fn render_image(request: &RenderRequest) -> QrLabelResult<String> {
    let matrix = symbol::encode(
        &request.text,
        request.error_correction,
        request.module_size,
        request.border_modules,
    )?;
    let image = symbol::render(&matrix, &request.foreground, &request.background);
    Ok(image.serialize(&request.serialization))
}

pub fn render(request: &RenderRequest) -> QrLabelResult<RenderedDocument> {
    let image = render_image(request)?;

    if !request.emit_label {
        return Ok(RenderedDocument {
            kind: DocumentKind::Image,
            body: image,
        });
    }

    let upper = caption_markup(request, "upper", &request.upper_caption);
    let lower = caption_markup(request, "lower", &request.lower_caption);
    let title = escape_html(&request.text);

    Ok(RenderedDocument {
        kind: DocumentKind::Label,
        body: template::generate_label_html(&title, &upper, &image, &lower),
    })
}

/// Escape a caption and turn each literal backslash-n pair into a line break.
fn caption_markup(request: &RenderRequest, position: &str, caption: &str) -> String {
    let markup = escape_html(caption).replace("\\n", "<br>");
    if request.log_level.enables(Level::DEBUG) {
        tracing::debug!("{} caption: {:?} -> {:?}", position, caption, markup);
    }
    markup
}

/// Neutralise `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
