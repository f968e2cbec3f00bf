use tracing::debug;

use crate::document::XmlElement;

/// Why a section lookup came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMissing {
    /// The document has no sections with the requested tag at all.
    NoSections,
    /// Sections exist but none carries the configured name.
    NotFound { candidates: usize },
}

/// Find the first section named `tag` anywhere below `root` whose
/// `name_attribute` equals `target_name` exactly.
///
/// Feeds are not expected to repeat an area or station name, so the first
/// match wins.
pub fn find_section<'a>(
    root: &'a XmlElement,
    tag: &'a str,
    name_attribute: &str,
    target_name: &str,
) -> Result<&'a XmlElement, SectionMissing> {
    let mut candidates = 0;

    for node in root.find_all(tag) {
        candidates += 1;
        let name = node.attr(name_attribute);
        debug!("Got a {} node of {:?}", tag, name);
        if name == Some(target_name) {
            return Ok(node);
        }
    }

    if candidates == 0 {
        Err(SectionMissing::NoSections)
    } else {
        Err(SectionMissing::NotFound { candidates })
    }
}
