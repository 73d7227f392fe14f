//! Recursive containment rules for template elements.
//!
//! The element collection is a forest: a template owns its children through
//! its `elements` sequence and nothing else refers to them. Ownership makes
//! cycles unrepresentable; sharing is prevented by requiring every id in the
//! forest to be unique, which [`ensure_unique_ids`] checks before a subtree is
//! inserted.

use std::collections::HashSet;

use crate::{ComposerError, ComposerResult, Element, ElementId, Position};

/// Depth-first, pre-order iterator over a forest of elements.
pub struct Walk<'a> {
    stack: Vec<std::slice::Iter<'a, Element>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        loop {
            let level = self.stack.last_mut()?;
            if let Some(element) = level.next() {
                let children = element.children();
                if !children.is_empty() {
                    self.stack.push(children.iter());
                }
                return Some(element);
            }
            self.stack.pop();
        }
    }
}

/// Visit every element in the forest, parents before their children.
#[must_use]
pub fn walk(elements: &[Element]) -> Walk<'_> {
    Walk {
        stack: vec![elements.iter()],
    }
}

/// Find an element anywhere in the forest.
#[must_use]
pub fn find(elements: &[Element], id: ElementId) -> Option<&Element> {
    walk(elements).find(|element| element.id == id)
}

/// Find an element anywhere in the forest, mutably.
pub fn find_mut(elements: &mut [Element], id: ElementId) -> Option<&mut Element> {
    for element in elements.iter_mut() {
        if element.id == id {
            return Some(element);
        }
        if let Some(children) = element.children_mut() {
            if let Some(found) = find_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Check whether an id is present anywhere in the forest.
#[must_use]
pub fn contains(elements: &[Element], id: ElementId) -> bool {
    find(elements, id).is_some()
}

/// The template directly owning `id`, or `None` for top-level or absent ids.
#[must_use]
pub fn parent_of(elements: &[Element], id: ElementId) -> Option<&Element> {
    walk(elements).find(|element| element.children().iter().any(|child| child.id == id))
}

/// Nesting depth of `id`: 0 for top-level elements.
#[must_use]
pub fn depth(elements: &[Element], id: ElementId) -> Option<usize> {
    for element in elements {
        if element.id == id {
            return Some(0);
        }
        if let Some(d) = depth(element.children(), id) {
            return Some(d + 1);
        }
    }
    None
}

/// Number of elements below `element`, at any depth.
#[must_use]
pub fn descendant_count(element: &Element) -> usize {
    walk(element.children()).count()
}

/// Replace the element with `id` by `replacement`, wherever it sits.
///
/// Returns `false` if nothing matched.
pub fn replace(elements: &mut [Element], id: ElementId, replacement: Element) -> bool {
    match find_mut(elements, id) {
        Some(slot) => {
            *slot = replacement;
            true
        }
        None => false,
    }
}

/// Remove the element with `id` together with its whole subtree.
pub fn remove(elements: &mut Vec<Element>, id: ElementId) -> Option<Element> {
    if let Some(index) = elements.iter().position(|element| element.id == id) {
        return Some(elements.remove(index));
    }
    elements
        .iter_mut()
        .filter_map(Element::children_mut)
        .find_map(|children| remove(children, id))
}

/// Page-relative position of `id`.
///
/// Child positions are relative to their template's content box, so the
/// result accumulates every ancestor's position and padding.
#[must_use]
pub fn absolute_position(elements: &[Element], id: ElementId) -> Option<Position> {
    locate(elements, id, Position::default())
}

fn locate(elements: &[Element], id: ElementId, origin: Position) -> Option<Position> {
    for element in elements {
        let position = origin + element.position;
        if element.id == id {
            return Some(position);
        }
        if element.is_template() {
            let content_origin = position + element.content_offset();
            if let Some(found) = locate(element.children(), id, content_origin) {
                return Some(found);
            }
        }
    }
    None
}

/// Check that inserting `incoming` keeps every id in the forest unique.
///
/// `replacing` names an element about to be overwritten; its subtree is not
/// counted as existing, so a replacement may reuse its own and its
/// children's ids.
///
/// # Errors
///
/// Returns [`ComposerError::DuplicateElementId`] if `incoming` repeats an id
/// internally or reuses one already present elsewhere in `existing`.
pub fn ensure_unique_ids(
    existing: &[Element],
    incoming: &Element,
    replacing: Option<ElementId>,
) -> ComposerResult<()> {
    let mut seen = HashSet::new();
    collect_ids(existing, replacing, &mut seen);
    for element in walk(std::slice::from_ref(incoming)) {
        if !seen.insert(element.id) {
            return Err(ComposerError::DuplicateElementId(element.id.to_string()));
        }
    }
    Ok(())
}

/// Check that no id repeats anywhere in the forest.
///
/// # Errors
///
/// Returns [`ComposerError::DuplicateElementId`] naming the first repeat.
pub fn ensure_forest(elements: &[Element]) -> ComposerResult<()> {
    let mut seen = HashSet::new();
    for element in walk(elements) {
        if !seen.insert(element.id) {
            return Err(ComposerError::DuplicateElementId(element.id.to_string()));
        }
    }
    Ok(())
}

fn collect_ids(elements: &[Element], skip: Option<ElementId>, seen: &mut HashSet<ElementId>) {
    for element in elements {
        if Some(element.id) == skip {
            continue;
        }
        seen.insert(element.id);
        collect_ids(element.children(), skip, seen);
    }
}
