//! Adapter over the QR symbol encoder.
//!
//! `encode` turns text into a module matrix and `render` draws that matrix as a single
//! vector path. Version selection is left to the encoder, which picks the smallest symbol
//! that fits at the requested error-correction level.

use qrcode::{EcLevel, QrCode};
use serde::Serialize;

use crate::core::colors::Color;
use crate::core::svg::{Element, VectorImage};
use crate::error::{QrLabelError, QrLabelResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L" => Some(Self::L),
            "M" => Some(Self::M),
            "Q" => Some(Self::Q),
            "H" => Some(Self::H),
            _ => None,
        }
    }
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

/// Dark/light modules of an encoded symbol plus the geometry used to draw it.
#[derive(Clone, Debug)]
pub struct SymbolMatrix {
    width: usize,
    dark: Vec<bool>,
    module_size: u32,
    border: u32,
}

impl SymbolMatrix {
    /// Modules per side, excluding the border.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.dark[y * self.width + x]
    }

    /// Side length of the drawn image, border included.
    pub fn pixel_size(&self) -> u64 {
        side_length(self.width, self.module_size, self.border).unwrap_or(u64::MAX)
    }

    fn path_data(&self) -> String {
        let size = u64::from(self.module_size);
        let border = u64::from(self.border);
        let mut d = String::new();
        for y in 0..self.width {
            let mut x = 0;
            while x < self.width {
                if !self.is_dark(x, y) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.width && self.is_dark(x, y) {
                    x += 1;
                }
                let run = (x - start) as u64 * size;
                d.push_str(&format!(
                    "M{},{}h{}v{}h-{}z",
                    (start as u64 + border) * size,
                    (y as u64 + border) * size,
                    run,
                    size,
                    run
                ));
            }
        }
        d
    }
}

fn side_length(width: usize, module_size: u32, border: u32) -> Option<u64> {
    (width as u64)
        .checked_add(2 * u64::from(border))?
        .checked_mul(u64::from(module_size))
}

/// Encode `data` into a symbol matrix.
///
/// Fails with an encoding error when the data does not fit at `level`, or when the drawn
/// side length would not fit in 64 bits.
pub fn encode(
    data: &str,
    level: ErrorCorrection,
    module_size: u32,
    border: u32,
) -> QrLabelResult<SymbolMatrix> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), level.into()).map_err(|e| {
        QrLabelError::encoding(format!(
            "cannot encode {} bytes at error correction level {:?}: {}",
            data.len(),
            level,
            e
        ))
    })?;

    let dark = code
        .to_colors()
        .into_iter()
        .map(|module| module == qrcode::Color::Dark)
        .collect();

    if side_length(code.width(), module_size, border).is_none() {
        return Err(QrLabelError::encoding(format!(
            "image size overflows with box size {module_size} and border {border}"
        )));
    }

    Ok(SymbolMatrix {
        width: code.width(),
        dark,
        module_size,
        border,
    })
}

/// Draw the matrix as a background rectangle and one path covering the dark modules.
pub fn render(matrix: &SymbolMatrix, foreground: &Color, background: &Color) -> VectorImage {
    let size = matrix.pixel_size();
    let root = Element::new("svg")
        .attr("width", millimetres(size))
        .attr("height", millimetres(size))
        .attr("version", "1.1")
        .attr("viewBox", format!("0 0 {size} {size}"))
        .child(
            Element::new("rect")
                .attr("x", "0")
                .attr("y", "0")
                .attr("width", size.to_string())
                .attr("height", size.to_string())
                .attr("fill", background.to_svg()),
        )
        .child(
            Element::new("path")
                .attr("d", matrix.path_data())
                .attr("id", "qr-path")
                .attr("fill", foreground.to_svg())
                .attr("fill-rule", "nonzero"),
        );
    VectorImage::new(root)
}

/// Ten pixels to the millimetre.
fn millimetres(pixels: u64) -> String {
    if pixels % 10 == 0 {
        format!("{}mm", pixels / 10)
    } else {
        format!("{}.{}mm", pixels / 10, pixels % 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(ErrorCorrection::parse("q"), Some(ErrorCorrection::Q));
        assert_eq!(ErrorCorrection::parse("H"), Some(ErrorCorrection::H));
        assert_eq!(ErrorCorrection::parse("X"), None);
        assert_eq!(ErrorCorrection::parse("1"), None);
    }

    #[test]
    fn smallest_symbol_is_21_modules() {
        let matrix = encode("hello", ErrorCorrection::L, 10, 4).unwrap();
        assert_eq!(matrix.width(), 21);
        assert_eq!(matrix.pixel_size(), 290);
        // top-left finder pattern corner
        assert!(matrix.is_dark(0, 0));
    }

    #[test]
    fn capacity_depends_on_level() {
        let text = "x".repeat(1500);
        assert!(encode(&text, ErrorCorrection::L, 1, 0).is_ok());
        let err = encode(&text, ErrorCorrection::H, 1, 0).unwrap_err();
        assert!(matches!(err, QrLabelError::Encoding(_)));
    }

    #[test]
    fn oversized_geometry_is_an_encoding_error() {
        let err = encode("a", ErrorCorrection::M, u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, QrLabelError::Encoding(_)));

        // large but representable geometry still encodes
        let matrix = encode("a", ErrorCorrection::M, u32::MAX, 0).unwrap();
        assert_eq!(matrix.pixel_size(), 21 * u64::from(u32::MAX));
    }

    #[test]
    fn render_draws_background_and_path() {
        let matrix = encode("hello", ErrorCorrection::M, 5, 0).unwrap();
        let image = render(&matrix, &Color::Rgb(1, 2, 3), &Color::white());
        let root = image.root();
        assert_eq!(root.attribute("width"), Some("10.5mm"));
        assert_eq!(root.attribute("viewBox"), Some("0 0 105 105"));

        let rect = &root.children()[0];
        assert_eq!(rect.attribute("fill"), Some("white"));

        let path = &root.children()[1];
        assert_eq!(path.attribute("fill"), Some("rgb(1,2,3)"));
        let d = path.attribute("d").unwrap();
        // finder pattern row 0 is seven dark modules starting at the origin
        assert!(d.starts_with("M0,0h35v5h-35z"));
    }

    #[test]
    fn border_offsets_the_path() {
        let matrix = encode("hello", ErrorCorrection::L, 10, 4).unwrap();
        let image = render(&matrix, &Color::black(), &Color::white());
        let d = image.root().children()[1].attribute("d").unwrap();
        assert!(d.starts_with("M40,40h70v10h-70z"));
    }
}
