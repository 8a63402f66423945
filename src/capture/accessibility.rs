//! Accessibility queries for selected text
//!
//! The platform backends expose the element under a screen point and, for
//! any element, its selected text and its immediate children. The lookup
//! here tries the element itself and then its children, one level deep
//! only, stopping at the first child with a non-empty selection.
//!
//! Every call site returns a [`QueryResult`] so callers can see *why* no
//! text was found. None of these failures are fatal.

use thiserror::Error;
use tracing::trace;

/// Why an accessibility query produced no text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("No accessible element at ({x}, {y})")]
    ElementNotFound { x: i32, y: i32 },

    #[error("Element does not expose a text-selection capability")]
    PatternUnsupported,

    #[error("Element has no selected text")]
    NoSelection,

    #[error("Accessibility call failed: {0}")]
    Platform(String),
}

/// Result type for accessibility queries
pub type QueryResult<T> = Result<T, QueryError>;

/// A node in the platform accessibility tree.
pub trait AccessibleElement: Sized {
    /// Full text of the first selected range.
    ///
    /// Returns [`QueryError::PatternUnsupported`] when the element has no
    /// text-selection capability and [`QueryError::NoSelection`] when it
    /// has one but nothing is selected.
    fn selected_text(&self) -> QueryResult<String>;

    /// Immediate children of this element.
    fn children(&self) -> QueryResult<Vec<Self>>;

    /// Short human-readable label for logs.
    fn describe(&self) -> String {
        "element".to_string()
    }
}

/// Entry point into the platform accessibility tree.
///
/// Implementations are not expected to be thread-safe; the detector only
/// ever calls them from its polling thread.
pub trait AccessibilityProvider {
    type Element: AccessibleElement;

    /// Element located at the given screen coordinates.
    fn element_at(&self, x: i32, y: i32) -> QueryResult<Self::Element>;
}

/// Where the selected text was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// The element under the cursor
    Element,
    /// The n-th immediate child of that element
    Child(usize),
}

/// Text read from the accessibility tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundText {
    pub text: String,
    pub source: TextSource,
}

/// Selected text of a single element, treating an empty selection as none.
pub fn text_from_element<E: AccessibleElement>(element: &E) -> QueryResult<String> {
    let text = element.selected_text()?;
    if text.is_empty() {
        return Err(QueryError::NoSelection);
    }
    Ok(text)
}

/// Selected text at a screen position.
///
/// Tries the element at `(x, y)` first, then each of its immediate
/// children in order. Grandchildren are never visited. When nothing
/// yields text, the error reported is the one from the element itself.
pub fn lookup_selected_text<P>(provider: &P, x: i32, y: i32) -> QueryResult<FoundText>
where
    P: AccessibilityProvider + ?Sized,
{
    let element = provider.element_at(x, y)?;
    trace!("Element at ({}, {}): {}", x, y, element.describe());

    let own_error = match text_from_element(&element) {
        Ok(text) => {
            return Ok(FoundText {
                text,
                source: TextSource::Element,
            })
        }
        Err(e) => e,
    };

    for (index, child) in element.children()?.iter().enumerate() {
        match text_from_element(child) {
            Ok(text) => {
                trace!("Selected text found in child {} ({})", index, child.describe());
                return Ok(FoundText {
                    text,
                    source: TextSource::Child(index),
                });
            }
            Err(e) => trace!("Child {} ({}) yielded no text: {}", index, child.describe(), e),
        }
    }

    Err(own_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Clone)]
    struct Node {
        text: QueryResult<String>,
        children: QueryResult<Vec<Node>>,
    }

    impl Node {
        fn leaf(text: QueryResult<String>) -> Self {
            Self {
                text,
                children: Ok(Vec::new()),
            }
        }
    }

    impl AccessibleElement for Node {
        fn selected_text(&self) -> QueryResult<String> {
            self.text.clone()
        }

        fn children(&self) -> QueryResult<Vec<Self>> {
            self.children.clone()
        }
    }

    struct Tree {
        root: QueryResult<Node>,
        queries: Cell<usize>,
    }

    impl AccessibilityProvider for Tree {
        type Element = Node;

        fn element_at(&self, _x: i32, _y: i32) -> QueryResult<Node> {
            self.queries.set(self.queries.get() + 1);
            self.root.clone()
        }
    }

    fn tree(root: QueryResult<Node>) -> Tree {
        Tree {
            root,
            queries: Cell::new(0),
        }
    }

    #[test]
    fn test_text_from_element_itself() {
        let provider = tree(Ok(Node::leaf(Ok("Hello World".into()))));
        let found = lookup_selected_text(&provider, 1, 2).unwrap();
        assert_eq!(found.text, "Hello World");
        assert_eq!(found.source, TextSource::Element);
        assert_eq!(provider.queries.get(), 1);
    }

    #[test]
    fn test_falls_back_to_first_child_with_text() {
        let root = Node {
            text: Err(QueryError::PatternUnsupported),
            children: Ok(vec![
                Node::leaf(Err(QueryError::PatternUnsupported)),
                Node::leaf(Ok(String::new())),
                Node::leaf(Ok("second".into())),
                Node::leaf(Ok("third".into())),
            ]),
        };
        let found = lookup_selected_text(&tree(Ok(root)), 0, 0).unwrap();
        assert_eq!(found.text, "second");
        assert_eq!(found.source, TextSource::Child(2));
    }

    #[test]
    fn test_grandchildren_are_not_visited() {
        let grandchild = Node::leaf(Ok("deep".into()));
        let child = Node {
            text: Err(QueryError::NoSelection),
            children: Ok(vec![grandchild]),
        };
        let root = Node {
            text: Err(QueryError::PatternUnsupported),
            children: Ok(vec![child]),
        };
        let err = lookup_selected_text(&tree(Ok(root)), 0, 0).unwrap_err();
        assert_eq!(err, QueryError::PatternUnsupported);
    }

    #[test]
    fn test_missing_element_is_reported() {
        let provider = tree(Err(QueryError::ElementNotFound { x: 5, y: 6 }));
        let err = lookup_selected_text(&provider, 5, 6).unwrap_err();
        assert_eq!(err, QueryError::ElementNotFound { x: 5, y: 6 });
    }

    #[test]
    fn test_children_failure_is_reported() {
        let root = Node {
            text: Err(QueryError::NoSelection),
            children: Err(QueryError::Platform("walker failed".into())),
        };
        let err = lookup_selected_text(&tree(Ok(root)), 0, 0).unwrap_err();
        assert_eq!(err, QueryError::Platform("walker failed".into()));
    }

    #[test]
    fn test_empty_selection_counts_as_none() {
        let provider = tree(Ok(Node::leaf(Ok(String::new()))));
        assert_eq!(
            lookup_selected_text(&provider, 0, 0).unwrap_err(),
            QueryError::NoSelection
        );
    }
}
