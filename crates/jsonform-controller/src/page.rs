//! The document a form is rendered into.

use std::collections::BTreeMap;

/// Default selector of the title element.
pub const DEFAULT_TITLE_ELEMENT: &str = "#title";
/// Default selector of the result sink.
pub const DEFAULT_RESULT_ELEMENT: &str = "#res";
/// Default selector of the destination form element.
pub const DEFAULT_FORM_ELEMENT: &str = "#schema-form";

/// Page operations the controller needs.
///
/// Operations addressing an element that does not exist are no-ops, the way a
/// selector matching nothing behaves in a browser.
pub trait Page: Send {
    /// Full URL of the page, including its query string.
    fn location(&self) -> String;

    /// Document title.
    fn document_title(&self) -> String;

    /// Replaces the document title.
    fn set_document_title(&mut self, title: &str);

    /// Returns true if an element matches the selector.
    fn contains(&self, selector: &str) -> bool;

    /// Text content of an element.
    fn text(&self, selector: &str) -> Option<String>;

    /// Replaces the text content of an element.
    fn set_text(&mut self, selector: &str, text: &str);

    /// Replaces the inner HTML of an element.
    fn set_html(&mut self, selector: &str, html: &str);

    /// Shows or hides an element.
    fn set_visible(&mut self, selector: &str, visible: bool);
}

/// Selectors of the elements a form works with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Elements {
    /// Title element.
    pub title: Option<String>,
    /// Description element; has no default.
    pub description: Option<String>,
    /// Result sink.
    pub result: Option<String>,
    /// Destination form element.
    pub form: Option<String>,
}

impl Elements {
    /// Fills unset title, result and form selectors with their defaults.
    pub fn bind_defaults(&mut self) {
        self.title
            .get_or_insert_with(|| DEFAULT_TITLE_ELEMENT.to_string());
        self.result
            .get_or_insert_with(|| DEFAULT_RESULT_ELEMENT.to_string());
        self.form
            .get_or_insert_with(|| DEFAULT_FORM_ELEMENT.to_string());
    }
}

/// State of one [`MemoryPage`] element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryElement {
    /// Text or HTML content, whichever was written last.
    pub content: String,
    /// Whether the element is shown.
    pub visible: bool,
}

/// In-memory [`Page`] for headless hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    location: String,
    document_title: String,
    elements: BTreeMap<String, MemoryElement>,
}

impl MemoryPage {
    /// Creates an empty page at the given URL.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Creates a page with the default title, result and form elements.
    #[must_use]
    pub fn standard(location: impl Into<String>) -> Self {
        Self::new(location)
            .with_element(DEFAULT_TITLE_ELEMENT)
            .with_element(DEFAULT_RESULT_ELEMENT)
            .with_element(DEFAULT_FORM_ELEMENT)
    }

    /// Adds an empty, visible element.
    #[must_use]
    pub fn with_element(mut self, selector: impl Into<String>) -> Self {
        self.elements.insert(
            selector.into(),
            MemoryElement {
                content: String::new(),
                visible: true,
            },
        );
        self
    }

    /// Returns an element's state.
    #[must_use]
    pub fn element(&self, selector: &str) -> Option<&MemoryElement> {
        self.elements.get(selector)
    }

    /// Returns an element's content, or `""` if it does not exist.
    #[must_use]
    pub fn content(&self, selector: &str) -> &str {
        self.elements
            .get(selector)
            .map_or("", |element| element.content.as_str())
    }

    /// Returns true if the element exists and is shown.
    #[must_use]
    pub fn is_visible(&self, selector: &str) -> bool {
        self.elements
            .get(selector)
            .is_some_and(|element| element.visible)
    }
}

impl Page for MemoryPage {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn document_title(&self) -> String {
        self.document_title.clone()
    }

    fn set_document_title(&mut self, title: &str) {
        self.document_title = title.to_string();
    }

    fn contains(&self, selector: &str) -> bool {
        self.elements.contains_key(selector)
    }

    fn text(&self, selector: &str) -> Option<String> {
        self.elements
            .get(selector)
            .map(|element| element.content.clone())
    }

    fn set_text(&mut self, selector: &str, text: &str) {
        if let Some(element) = self.elements.get_mut(selector) {
            element.content = text.to_string();
        }
    }

    fn set_html(&mut self, selector: &str, html: &str) {
        if let Some(element) = self.elements.get_mut(selector) {
            element.content = html.to_string();
        }
    }

    fn set_visible(&mut self, selector: &str, visible: bool) {
        if let Some(element) = self.elements.get_mut(selector) {
            element.visible = visible;
        }
    }
}
