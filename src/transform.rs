use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{QualName, local_name, ns};
use sha2::Digest as _;
use tendril::TendrilSink as _;
use url::Url;

use crate::headings::{Heading, HeadingSlugger, heading_of};

/// Class carried by in-article links rewritten into in-app controls.
pub const NAV_CONTROL_CLASS: &str = "wiki-link";
/// Attribute on an in-app control holding the original wiki href.
pub const NAV_HREF_ATTR: &str = "data-nav-href";
/// Class of the divider inserted before each level-2 heading.
pub const DIVIDER_CLASS: &str = "section-divider";

/// A transformed article: sanitized HTML ready for rendering plus the
/// heading metadata collected during the walk.
#[derive(Debug, Clone)]
pub struct Article {
    pub html: String,
    pub headings: Vec<Heading>,
}

/// Rewrites fetched wiki HTML for in-app rendering.
///
/// In one top-down pass over the parsed tree this assigns heading anchors,
/// rebases root-relative image sources onto the wiki origin, and turns
/// same-origin links into in-app controls that surface the original href
/// through [`nav_target`] instead of navigating. Markup the parser cannot
/// make sense of is rendered as whatever structure was recoverable; the
/// transform itself never fails.
#[derive(Debug)]
pub struct Transformer {
    origin: Url,
    last_fingerprint: Option<String>,
}

impl Transformer {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            last_fingerprint: None,
        }
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Transform `html`, invoking `on_headings` with the full heading list.
    ///
    /// The callback only fires when the input differs from the previous
    /// invocation, so a caller re-rendering the same article does not loop.
    pub fn transform(
        &mut self,
        html: &str,
        on_headings: impl FnOnce(&[Heading]),
    ) -> Article {
        let article = transform_article(html, &self.origin);

        let fingerprint = hex::encode(sha2::Sha256::digest(html.as_bytes()));
        if self.last_fingerprint.as_deref() != Some(fingerprint.as_str()) {
            self.last_fingerprint = Some(fingerprint);
            on_headings(&article.headings);
        }

        article
    }
}

/// Stateless single-shot variant of [`Transformer::transform`].
pub fn transform_article(html: &str, origin: &Url) -> Article {
    let document = kuchikikiki::parse_html().one(html);

    let headings = rewrite_headings(&document);
    rewrite_images(&document, origin);
    rewrite_links(&document, origin);

    Article {
        html: serialize_body(&document),
        headings,
    }
}

/// If `node_html` is an in-app control produced by the transformer, return
/// the wiki href it stands for. The guide controller feeds this back into
/// navigation when the control is activated.
pub fn nav_target(element: &NodeRef) -> Option<String> {
    let data = element.as_element()?;
    if data.name.local.as_ref() != "button" {
        return None;
    }
    data.attributes
        .borrow()
        .get(NAV_HREF_ATTR)
        .map(str::to_owned)
}

fn rewrite_headings(document: &NodeRef) -> Vec<Heading> {
    let mut slugger = HeadingSlugger::new();
    let mut headings = Vec::new();
    // Collect before mutating; inserting dividers mid-iteration would
    // invalidate the traversal.
    let mut nodes = Vec::new();

    for node in document.inclusive_descendants() {
        if let Some(heading) = heading_of(&node, &mut slugger) {
            nodes.push((node.clone(), heading));
        }
    }

    for (node, heading) in nodes {
        if let Some(element) = node.as_element() {
            element
                .attributes
                .borrow_mut()
                .insert(local_name!("id"), heading.identifier.clone());
            if heading.level == 2 {
                node.insert_before(divider_element());
            }
        }
        headings.push(heading);
    }

    headings
}

fn rewrite_images(document: &NodeRef, origin: &Url) {
    let Ok(images) = document.select("img") else {
        return;
    };

    for image in images.collect::<Vec<_>>() {
        let element = image.as_node().as_element();
        let Some(element) = element else { continue };

        let src = element
            .attributes
            .borrow()
            .get(local_name!("src"))
            .map(str::to_owned);
        let Some(src) = src else { continue };
        if !src.starts_with('/') {
            continue;
        }

        match origin.join(&src) {
            Ok(absolute) => {
                element
                    .attributes
                    .borrow_mut()
                    .insert(local_name!("src"), absolute.to_string());
            }
            Err(err) => {
                tracing::debug!(src, ?err, "image src does not join onto origin; left as-is");
            }
        }
    }
}

fn rewrite_links(document: &NodeRef, origin: &Url) {
    let Ok(anchors) = document.select("a") else {
        return;
    };
    let origin_prefix = origin.as_str().trim_end_matches('/').to_owned();

    for anchor in anchors.collect::<Vec<_>>() {
        let node = anchor.as_node();
        let Some(element) = node.as_element() else { continue };

        let href = element
            .attributes
            .borrow()
            .get(local_name!("href"))
            .map(str::to_owned);
        let Some(href) = href else { continue };
        if !href.starts_with(&origin_prefix) {
            continue;
        }

        let control = nav_control_element(&href);
        let children: Vec<_> = node.children().collect();
        for child in children {
            control.append(child);
        }
        node.insert_before(control);
        node.detach();
    }
}

fn nav_control_element(href: &str) -> NodeRef {
    NodeRef::new_element(
        QualName::new(None, ns!(html), local_name!("button")),
        vec![
            (
                ExpandedName::new("", "type"),
                Attribute {
                    prefix: None,
                    value: "button".into(),
                },
            ),
            (
                ExpandedName::new("", "class"),
                Attribute {
                    prefix: None,
                    value: NAV_CONTROL_CLASS.into(),
                },
            ),
            (
                ExpandedName::new("", NAV_HREF_ATTR),
                Attribute {
                    prefix: None,
                    value: href.into(),
                },
            ),
        ],
    )
}

fn divider_element() -> NodeRef {
    NodeRef::new_element(
        QualName::new(None, ns!(html), local_name!("hr")),
        vec![(
            ExpandedName::new("", "class"),
            Attribute {
                prefix: None,
                value: DIVIDER_CLASS.into(),
            },
        )],
    )
}

/// Serialize only the body children: the parser wraps fragments in a full
/// html/head/body scaffold that the rendering layer does not want.
fn serialize_body(document: &NodeRef) -> String {
    let Ok(mut bodies) = document.select("body") else {
        return String::new();
    };
    let Some(body) = bodies.next() else {
        return String::new();
    };

    let mut out = Vec::new();
    for child in body.as_node().children() {
        if child.serialize(&mut out).is_err() {
            tracing::warn!("failed to serialize a transformed node; skipping it");
        }
    }
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://example.org").unwrap()
    }

    fn transform(html: &str) -> Article {
        transform_article(html, &origin())
    }

    #[test]
    fn root_relative_image_src_is_rebased_onto_origin() {
        let article = transform(r#"<img src="/x.png" alt="campus map" width="80">"#);
        assert!(article.html.contains(r#"src="https://example.org/x.png""#));
        // Unrelated attributes survive untouched.
        assert!(article.html.contains(r#"alt="campus map""#));
        assert!(article.html.contains(r#"width="80""#));
    }

    #[test]
    fn absolute_image_src_is_left_alone() {
        let article = transform(r#"<img src="https://cdn.test/y.png">"#);
        assert!(article.html.contains(r#"src="https://cdn.test/y.png""#));
    }

    #[test]
    fn same_origin_link_becomes_an_in_app_control() {
        let article = transform(r#"<a href="https://example.org/guide/2fa">Read more</a>"#);
        assert!(!article.html.contains("<a "));
        assert!(article.html.contains("<button"));
        assert!(article.html.contains(r#"data-nav-href="https://example.org/guide/2fa""#));
        assert!(article.html.contains("Read more"));
    }

    #[test]
    fn foreign_link_stays_an_ordinary_anchor() {
        let article = transform(r#"<a href="https://other.org/x">elsewhere</a>"#);
        assert!(article.html.contains(r#"<a href="https://other.org/x">elsewhere</a>"#));
        assert!(!article.html.contains("<button"));
    }

    #[test]
    fn level_two_headings_get_a_preceding_divider() {
        let article = transform("<h1>Guide</h1><h2>Setup</h2><h3>Windows</h3>");
        let divider = format!(r#"<hr class="{DIVIDER_CLASS}">"#);
        let divider_pos = article.html.find(&divider).unwrap();
        let h2_pos = article.html.find("<h2").unwrap();
        assert!(divider_pos < h2_pos);
        // Only the h2 gets one.
        assert_eq!(article.html.matches(&divider).count(), 1);
    }

    #[test]
    fn headings_receive_ids_and_are_reported() {
        let article = transform(r#"<h1>WiFi</h1><h2 id="fix">Troubleshooting</h2>"#);
        assert!(article.html.contains(r#"<h1 id="wifi">"#));
        assert!(article.html.contains(r#"id="fix""#));
        assert_eq!(article.headings.len(), 2);
        assert_eq!(article.headings[0].identifier, "wifi");
        assert_eq!(article.headings[1].identifier, "fix");
    }

    #[test]
    fn links_nested_in_headings_are_still_rewritten() {
        let article =
            transform(r#"<h2><a href="https://example.org/guide/vpn">VPN</a></h2>"#);
        assert!(article.html.contains("<button"));
        assert!(article.html.contains(r#"<h2 id="vpn">"#));
    }

    #[test]
    fn malformed_markup_degrades_instead_of_failing() {
        let article = transform("<h1>Broken<p><b>bold <i>text</b></i><h2>Next");
        assert_eq!(article.headings.len(), 2);
        assert!(article.html.contains("bold"));
    }

    #[test]
    fn heading_callback_fires_once_per_distinct_input() {
        let mut transformer = Transformer::new(origin());
        let mut calls = 0;

        transformer.transform("<h1>One</h1>", |_| calls += 1);
        assert_eq!(calls, 1);

        // Same input again: no re-fire.
        transformer.transform("<h1>One</h1>", |_| calls += 1);
        assert_eq!(calls, 1);

        // New input fires again, with headings already collected.
        transformer.transform("<h1>Two</h1>", |headings| {
            calls += 1;
            assert_eq!(headings[0].identifier, "two");
        });
        assert_eq!(calls, 2);
    }
}
