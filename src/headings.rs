use std::collections::HashMap;

use kuchikikiki::NodeRef;
use markup5ever::local_name;
use tendril::TendrilSink as _;

/// One heading of an article, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Anchor identifier, unique within one document.
    pub identifier: String,
    pub text: String,
    /// 1 through 6.
    pub level: u8,
}

/// Nested view of the same headings: a heading of level L hangs under the
/// nearest preceding heading of a strictly lower level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingTree {
    pub heading: Heading,
    pub children: Vec<HeadingTree>,
}

/// Anchor id for a string: lowercase, whitespace runs become single hyphens,
/// anything outside word characters and hyphens is dropped, hyphen runs are
/// collapsed and trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for ch in text.trim().chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
            continue;
        }
        if ch.is_alphanumeric() || ch == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        }
    }
    slug
}

/// Assigns identifiers to headings within a single document: explicit ids
/// win, otherwise the text is slugified. Generated slugs that collide get an
/// incrementing suffix so same-page anchors stay usable.
#[derive(Debug, Default)]
pub struct HeadingSlugger {
    seen: HashMap<String, usize>,
}

impl HeadingSlugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identifier(&mut self, explicit: Option<&str>, text: &str) -> String {
        if let Some(id) = explicit {
            let id = id.trim();
            if !id.is_empty() {
                return id.to_owned();
            }
        }

        let base = slugify(text);
        let base = if base.is_empty() { "section".to_owned() } else { base };
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{base}-{count}")
        }
    }
}

pub(crate) fn heading_level(tag: &str) -> Option<u8> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

pub(crate) fn heading_of(node: &NodeRef, slugger: &mut HeadingSlugger) -> Option<Heading> {
    let element = node.as_element()?;
    let level = heading_level(element.name.local.as_ref())?;

    let text = node.text_contents().trim().to_owned();
    if text.is_empty() {
        return None;
    }

    let explicit = element
        .attributes
        .borrow()
        .get(local_name!("id"))
        .map(str::to_owned);
    let identifier = slugger.identifier(explicit.as_deref(), &text);

    Some(Heading {
        identifier,
        text,
        level,
    })
}

/// Extract every non-empty heading from an HTML document, in document order.
/// Stateless: the same input always yields the same sequence.
pub fn extract_headings(html: &str) -> Vec<Heading> {
    let document = kuchikikiki::parse_html().one(html);
    let mut slugger = HeadingSlugger::new();
    let mut headings = Vec::new();

    for node in document.inclusive_descendants() {
        if let Some(heading) = heading_of(&node, &mut slugger) {
            headings.push(heading);
        }
    }

    headings
}

/// Nest a flat, document-ordered heading sequence: pop the stack while its
/// top is at the incoming level or deeper, then attach to the new top (or the
/// root set when the stack emptied).
pub fn build_hierarchy(headings: Vec<Heading>) -> Vec<HeadingTree> {
    struct Slot {
        heading: Heading,
        children: Vec<usize>,
    }

    let mut slots: Vec<Slot> = Vec::with_capacity(headings.len());
    let mut stack: Vec<usize> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();

    for heading in headings {
        while stack
            .last()
            .is_some_and(|&top| slots[top].heading.level >= heading.level)
        {
            stack.pop();
        }

        let index = slots.len();
        slots.push(Slot {
            heading,
            children: Vec::new(),
        });
        match stack.last() {
            Some(&parent) => slots[parent].children.push(index),
            None => roots.push(index),
        }
        stack.push(index);
    }

    fn assemble(slots: &[Slot], index: usize) -> HeadingTree {
        HeadingTree {
            heading: slots[index].heading.clone(),
            children: slots[index]
                .children
                .iter()
                .map(|&child| assemble(slots, child))
                .collect(),
        }
    }

    roots.into_iter().map(|index| assemble(&slots, index)).collect()
}

/// Convenience: extract and nest in one go.
pub fn extract_hierarchy(html: &str) -> Vec<HeadingTree> {
    build_hierarchy(extract_headings(html))
}
