use std::collections::BTreeMap;

/// Flat key/value string table for one locale.
///
/// Owned by a single render call; nothing caches these across renders.
pub type Translations = BTreeMap<String, String>;

/// One discovered locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleInfo {
    pub code: String,
    /// The default locale's URLs are unprefixed; all others get a
    /// `/{code}/` prefix.
    pub is_default: bool,
}

/// Page metadata injected into the HTML head.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: String,
    pub description: String,
    pub og: Option<OpenGraph>,
    pub twitter: Option<TwitterCard>,
}

/// Open Graph fields. Unset fields fall back to the top-level
/// title/description at injection time.
#[derive(Debug, Clone, Default)]
pub struct OpenGraph {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
}

/// Twitter card fields.
#[derive(Debug, Clone, Default)]
pub struct TwitterCard {
    pub card: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Attributes and content of one `<script>` tag.
#[derive(Debug, Clone, Default)]
pub struct ScriptTag {
    pub src: Option<String>,
    pub script_type: Option<String>,
    pub is_async: bool,
    pub defer: bool,
    /// Additional attributes, emitted in order after the known ones.
    pub attrs: Vec<(String, String)>,
    /// Inline script body. An external tag leaves this unset.
    pub text_content: Option<String>,
}

impl ScriptTag {
    /// A tag referencing an external script file.
    pub fn external(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    /// A tag with inline script content.
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            text_content: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Script tags a page emits around its content: `before` tags replace the
/// `{{scriptBefore}}` marker, `after` tags the `{{scriptAfter}}` marker.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub before: Vec<ScriptTag>,
    pub after: Vec<ScriptTag>,
}

/// The substitution set consumed by the template population pass.
#[derive(Debug, Clone, Default)]
pub struct HtmlTemplateData {
    pub locale: String,
    pub title: String,
    pub description: String,
    pub css: String,
    pub page_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_tag_external() {
        let tag = ScriptTag::external("/app.js");
        assert_eq!(tag.src.as_deref(), Some("/app.js"));
        assert!(tag.text_content.is_none());
        assert!(!tag.is_async);
    }

    #[test]
    fn test_script_tag_inline() {
        let tag = ScriptTag::inline("console.log(1)");
        assert!(tag.src.is_none());
        assert_eq!(tag.text_content.as_deref(), Some("console.log(1)"));
    }
}
