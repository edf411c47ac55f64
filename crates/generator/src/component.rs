use crate::page::Page;
use leptos::prelude::*;
use site_kit_core::types::{Metadata, Script, Translations};

type MetadataFn = Box<dyn Fn(&Translations) -> Metadata + Send + Sync>;

/// Adapter exposing a Leptos view as a [`Page`].
///
/// The view function receives the locale's translations and its output is
/// rendered to static markup, no hydration.
///
/// ```ignore
/// registry.insert(
///     "about",
///     ViewPage::new(|t: &Translations| {
///         let heading = t.get("about.heading").cloned().unwrap_or_default();
///         view! { <main><h1>{heading}</h1></main> }
///     })
///     .with_metadata(|t| Metadata {
///         title: t.get("about.title").cloned().unwrap_or_default(),
///         ..Metadata::default()
///     }),
/// );
/// ```
pub struct ViewPage<F> {
    view_fn: F,
    metadata_fn: Option<MetadataFn>,
    script: Option<Script>,
}

impl<F, V> ViewPage<F>
where
    F: Fn(&Translations) -> V + Send + Sync,
    V: IntoView,
{
    pub fn new(view_fn: F) -> Self {
        Self {
            view_fn,
            metadata_fn: None,
            script: None,
        }
    }

    pub fn with_metadata(
        mut self,
        metadata_fn: impl Fn(&Translations) -> Metadata + Send + Sync + 'static,
    ) -> Self {
        self.metadata_fn = Some(Box::new(metadata_fn));
        self
    }

    pub fn with_scripts(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }
}

impl<F, V> Page for ViewPage<F>
where
    F: Fn(&Translations) -> V + Send + Sync,
    V: IntoView,
{
    fn render(&self, translations: &Translations) -> String {
        (self.view_fn)(translations).to_html()
    }

    fn metadata(&self, translations: &Translations) -> Option<Metadata> {
        self.metadata_fn.as_ref().map(|f| f(translations))
    }

    fn scripts(&self) -> Option<Script> {
        self.script.clone()
    }
}
