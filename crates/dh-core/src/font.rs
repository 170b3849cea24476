//! Font resolution: turning `fontFamily` / `fontWeight` / `fontStyle` into a
//! concrete [`FontName`], and de-duplicating the faces a batch has to load.

use crate::instruction::TextStyle;
use crate::model::FontName;
use indexmap::IndexMap;
use std::fmt;

/// Map a numeric CSS-style weight onto the host's named styles.
///
/// Weights that fall through every bucket (missing, NaN, or strictly between
/// 800 and 900) resolve to `Regular`.
pub fn style_for_weight(weight: Option<f32>) -> &'static str {
    let Some(w) = weight else {
        return "Regular";
    };
    if w <= 100.0 {
        "Thin"
    } else if w <= 200.0 {
        "ExtraLight"
    } else if w <= 300.0 {
        "Light"
    } else if w <= 400.0 {
        "Regular"
    } else if w <= 500.0 {
        "Medium"
    } else if w <= 600.0 {
        "SemiBold"
    } else if w <= 700.0 {
        "Bold"
    } else if w <= 800.0 {
        "ExtraBold"
    } else if w >= 900.0 {
        "Black"
    } else {
        "Regular"
    }
}

/// The named style a text style asks for: explicit `fontStyle` first,
/// otherwise derived from `fontWeight`.
pub fn resolve_style(style: &TextStyle) -> String {
    match style.font_style.as_deref() {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => style_for_weight(style.font_weight).to_string(),
    }
}

/// The family a text style asks for, `None` when absent or empty.
pub fn requested_family(style: &TextStyle) -> Option<&str> {
    style.font_family.as_deref().filter(|f| !f.is_empty())
}

/// The font a text node should be rendered with.
///
/// `None` means the node names no family: nothing is preloaded for it and it
/// renders with the fallback face.
pub fn requested_font(style: &TextStyle) -> Option<FontName> {
    requested_family(style).map(|family| FontName::new(family, resolve_style(style)))
}

/// De-duplication key for font load requests: `"{family}-{style}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey(String);

impl FontKey {
    pub fn of(font: &FontName) -> Self {
        FontKey(format!("{}-{}", font.family, font.style))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FontKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique fonts to load for a batch, in first-requested order.
#[derive(Debug, Clone, Default)]
pub struct FontRequests {
    fonts: IndexMap<FontKey, FontName>,
}

impl FontRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a font; returns `false` if an identical face was already requested.
    pub fn insert(&mut self, font: FontName) -> bool {
        let key = FontKey::of(&font);
        if self.fonts.contains_key(&key) {
            return false;
        }
        self.fonts.insert(key, font);
        true
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn into_fonts(self) -> Vec<FontName> {
        self.fonts.into_values().collect()
    }
}

impl FromIterator<FontName> for FontRequests {
    fn from_iter<I: IntoIterator<Item = FontName>>(iter: I) -> Self {
        let mut requests = FontRequests::new();
        for font in iter {
            requests.insert(font);
        }
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn weight_table() {
        let cases = [
            (Some(100.0), "Thin"),
            (Some(150.0), "ExtraLight"),
            (Some(300.0), "Light"),
            (Some(400.0), "Regular"),
            (Some(500.0), "Medium"),
            (Some(600.0), "SemiBold"),
            (Some(700.0), "Bold"),
            (Some(800.0), "ExtraBold"),
            (Some(900.0), "Black"),
            (Some(950.0), "Black"),
            (Some(0.0), "Thin"),
            (None, "Regular"),
            (Some(f32::NAN), "Regular"),
        ];
        for (weight, expected) in cases {
            assert_eq!(style_for_weight(weight), expected, "weight {weight:?}");
        }
    }

    #[test]
    fn weight_gap_between_extra_bold_and_black() {
        assert_eq!(style_for_weight(Some(850.0)), "Regular");
    }

    #[test]
    fn explicit_style_wins_over_weight() {
        let style = TextStyle {
            font_family: Some("Roboto".into()),
            font_weight: Some(700.0),
            font_style: Some("Condensed Italic".into()),
            ..Default::default()
        };
        assert_eq!(
            requested_font(&style),
            Some(FontName::new("Roboto", "Condensed Italic"))
        );

        let empty_style = TextStyle {
            font_style: Some(String::new()),
            ..style
        };
        assert_eq!(resolve_style(&empty_style), "Bold");
    }

    #[test]
    fn missing_family_requests_nothing() {
        let style = TextStyle {
            font_family: Some(String::new()),
            font_weight: Some(400.0),
            ..Default::default()
        };
        assert_eq!(requested_font(&style), None);
    }

    #[test]
    fn requests_dedup_by_key() {
        let requests: FontRequests = [
            FontName::new("Inter", "Bold"),
            FontName::new("Inter", "Regular"),
            FontName::new("Inter", "Bold"),
        ]
        .into_iter()
        .collect();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests.into_fonts(),
            vec![FontName::new("Inter", "Bold"), FontName::new("Inter", "Regular")]
        );
    }

    #[test]
    fn font_key_format() {
        assert_eq!(
            FontKey::of(&FontName::new("Open Sans", "SemiBold")).as_str(),
            "Open Sans-SemiBold"
        );
    }
}
