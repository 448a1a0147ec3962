use crate::protocol::CustomEvent;

/// The slice of a document element the loader needs.
///
/// Implementations are cheap handles onto a shared document (like DOM
/// element references), so every method takes `&self`. Queries only ever
/// return descendants, never the element itself, in document order.
pub trait Element: Clone + PartialEq {
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);
    fn remove_attribute(&self, name: &str);

    fn has_class(&self, class: &str) -> bool;
    fn toggle_class(&self, class: &str, on: bool);

    fn parent(&self) -> Option<Self>;
    fn matches(&self, selector: &str) -> bool;
    fn query_selector_all(&self, selector: &str) -> Vec<Self>;

    fn query_selector(&self, selector: &str) -> Option<Self> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// Replaces all children with a single literal text node.
    fn set_text_content(&self, text: &str);
    /// Replaces all children with the given markup.
    fn set_inner_html(&self, markup: &str);

    fn dispatch_event(&self, event: &CustomEvent);
}
