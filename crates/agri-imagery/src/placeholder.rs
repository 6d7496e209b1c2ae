//! Self-contained SVG placeholder images.

use crate::catalog::{self, CropGlyph};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const WIDTH: u32 = 300;
pub const HEIGHT: u32 = 200;

/// Characters left as-is by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn svg(glyph: &CropGlyph) -> String {
    format!(
        "<svg width=\"{w}\" height=\"{h}\" xmlns=\"http://www.w3.org/2000/svg\">\
<rect width=\"{w}\" height=\"{h}\" fill=\"#{color}\"/>\
<text x=\"{x}\" y=\"120\" font-size=\"80\" text-anchor=\"middle\" fill=\"white\">{glyph}</text></svg>",
        w = WIDTH,
        h = HEIGHT,
        x = WIDTH / 2,
        color = glyph.color,
        glyph = glyph.glyph,
    )
}

/// `data:` URL for a normalised crop name.
pub fn placeholder_url(normalized: &str) -> String {
    let svg = svg(&catalog::glyph_for(normalized));
    format!("data:image/svg+xml,{}", utf8_percent_encode(&svg, URI_COMPONENT))
}
