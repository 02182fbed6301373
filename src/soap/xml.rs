//! XML well-formedness and namespace-aware element lookup.
//!
//! Every lookup walks the whole document, so a match inside a document that
//! turns out to be malformed is never reported.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

/// Namespace URI plus local name of an element to look for.
struct ElementName<'a> {
    namespace: &'a [u8],
    local_name: &'a [u8],
}

#[derive(Default)]
struct Walk {
    /// Text content of the first matching element, if any matched.
    first_match: Option<String>,
}

/// Whether `content` parses as a well-formed XML document with one root element.
pub fn is_well_formed(content: &[u8]) -> bool {
    walk(content, None).is_some()
}

/// Whether `content` is well-formed and contains an element `local_name`
/// bound to `namespace`.
pub fn contains_element(content: &[u8], namespace: &str, local_name: &str) -> bool {
    first_element_text(content, namespace, local_name).is_some()
}

/// Text of the first element `local_name` bound to `namespace`.
///
/// Returns `None` when no such element exists or the document is malformed.
/// Text of nested children is concatenated, as a DOM `nodeValue` would be.
pub fn first_element_text(content: &[u8], namespace: &str, local_name: &str) -> Option<String> {
    let target = ElementName {
        namespace: namespace.as_bytes(),
        local_name: local_name.as_bytes(),
    };
    walk(content, Some(&target))?.first_match
}

fn walk(content: &[u8], target: Option<&ElementName<'_>>) -> Option<Walk> {
    let mut reader = NsReader::from_reader(content);
    let mut walk = Walk::default();
    let mut depth = 0usize;
    let mut seen_root = false;
    // (depth of the matched element, text collected so far)
    let mut capture: Option<(usize, String)> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event().ok()?;
        match event {
            Event::Start(start) => {
                if depth == 0 && seen_root {
                    return None;
                }
                check_attributes(&start)?;
                seen_root = true;
                depth += 1;
                if walk.first_match.is_none()
                    && capture.is_none()
                    && is_target(target, &resolved, &start)
                {
                    capture = Some((depth, String::new()));
                }
            }
            Event::Empty(start) => {
                if depth == 0 && seen_root {
                    return None;
                }
                check_attributes(&start)?;
                seen_root = true;
                if walk.first_match.is_none()
                    && capture.is_none()
                    && is_target(target, &resolved, &start)
                {
                    walk.first_match = Some(String::new());
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    return None;
                }
                if matches!(capture, Some((at, _)) if at == depth) {
                    walk.first_match = capture.take().map(|(_, text)| text);
                }
                depth -= 1;
            }
            Event::Text(text) => {
                let text = text.unescape().ok()?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return None;
                    }
                } else if let Some((_, collected)) = capture.as_mut() {
                    collected.push_str(&text);
                }
            }
            Event::CData(data) => {
                if depth == 0 {
                    return None;
                }
                if let Some((_, collected)) = capture.as_mut() {
                    collected.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    (seen_root && depth == 0).then_some(walk)
}

fn check_attributes(start: &BytesStart<'_>) -> Option<()> {
    for attribute in start.attributes() {
        attribute.ok()?;
    }
    Some(())
}

fn is_target(target: Option<&ElementName<'_>>, resolved: &ResolveResult<'_>, start: &BytesStart<'_>) -> bool {
    match (target, resolved) {
        (Some(target), ResolveResult::Bound(Namespace(ns))) => {
            *ns == target.namespace && start.local_name().as_ref() == target.local_name
        }
        _ => false,
    }
}
