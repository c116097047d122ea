use std::sync::LazyLock;

use regex::Regex;
use tendril::TendrilSink as _;
use url::Url;

use crate::formats::{HomeApiItem, SearchRecord};

// The listing endpoints ship icon/link fields as pre-rendered HTML
// fragments. Attribute extraction stays regex-based for wire compatibility
// with the existing backend payloads; a fragment without the attribute
// yields an empty string.
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href=["']([^"']+)["']"#).expect("hard-coded regex"));
static SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src=["']([^"']+)["']"#).expect("hard-coded regex"));

/// One service card on the home or categories page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCard {
    pub id: String,
    pub title: String,
    pub body: String,
    /// Absolute icon URL, when the fragment carried one.
    pub icon_src: Option<String>,
    /// Client route the card navigates to.
    pub link_to: String,
}

/// One search result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub body: String,
    /// Navigation path (`view_node` on the wire).
    pub path: String,
}

pub fn extract_href(fragment: &str) -> String {
    extract_attr(&HREF_RE, fragment)
}

pub fn extract_src(fragment: &str) -> String {
    extract_attr(&SRC_RE, fragment)
}

fn extract_attr(re: &Regex, fragment: &str) -> String {
    re.captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_default()
}

/// Plain text of an HTML fragment (titles arrive wrapped in markup).
pub fn strip_tags(fragment: &str) -> String {
    kuchikikiki::parse_html()
        .one(fragment)
        .text_contents()
        .trim()
        .to_owned()
}

/// Build the renderable cards from a listing response.
///
/// Wiki-origin links are rebased onto the client's `guides/` route space
/// before the href is extracted, mirroring the backend payload contract.
/// Icon sources are made absolute against the wiki origin.
pub fn service_cards(items: &[HomeApiItem], wiki_origin: &Url) -> Vec<ServiceCard> {
    let origin_prefix = format!("{}/", wiki_origin.as_str().trim_end_matches('/'));

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            // Only the first occurrence, like the upstream client: a second
            // mention of the origin elsewhere in the fragment stays as-is.
            let rebased = item.field_linkto.replacen(&origin_prefix, "guides/", 1);
            let link_to = extract_href(&rebased);
            let icon = extract_src(&item.field_services_icon);

            ServiceCard {
                id: card_id(&item.field_linkto, index),
                title: strip_tags(&item.title),
                body: item.body.clone(),
                icon_src: if icon.is_empty() {
                    None
                } else if icon.starts_with("http://") || icon.starts_with("https://") {
                    Some(icon)
                } else {
                    Some(format!("{origin_prefix}{}", icon.trim_start_matches('/')))
                },
                link_to,
            }
        })
        .collect()
}

/// Stable-ish card id derived from the link fragment: the last path segment,
/// lowercased with non-alphanumerics flattened to underscores. Falls back to
/// the card's position when the fragment has no usable href.
fn card_id(linkto_fragment: &str, index: usize) -> String {
    let href = extract_href(linkto_fragment);
    let last = href.split('/').filter(|s| !s.is_empty()).next_back();
    match last {
        Some(segment) if !segment.is_empty() => {
            let flattened: String = segment
                .to_lowercase()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            format!("service_{flattened}")
        }
        _ => format!("service_{index}"),
    }
}

pub fn search_hits(records: Vec<SearchRecord>) -> Vec<SearchHit> {
    records
        .into_iter()
        .map(|record| SearchHit {
            title: record.title,
            body: record.body,
            path: record.view_node,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_extraction_handles_both_quote_styles_and_absence() {
        assert_eq!(extract_href(r#"<a href="https://x.test/a">go</a>"#), "https://x.test/a");
        assert_eq!(extract_href(r#"<a href='/relative/b'>go</a>"#), "/relative/b");
        assert_eq!(extract_href("<a>no destination</a>"), "");
    }

    #[test]
    fn src_extraction_tolerates_missing_attribute() {
        assert_eq!(extract_src(r#"<img src="/icons/wifi.svg">"#), "/icons/wifi.svg");
        assert_eq!(extract_src("<img>"), "");
    }

    #[test]
    fn strip_tags_flattens_markup_to_text() {
        assert_eq!(strip_tags("<p><strong>WiFi</strong> access</p>"), "WiFi access");
        assert_eq!(strip_tags("plain"), "plain");
    }

    fn item(title: &str, icon: &str, linkto: &str) -> HomeApiItem {
        HomeApiItem {
            title: title.to_owned(),
            field_services_icon: icon.to_owned(),
            body: "<p>desc</p>".to_owned(),
            field_linkto: linkto.to_owned(),
        }
    }

    #[test]
    fn cards_rebase_wiki_links_and_icons() {
        let origin = Url::parse("https://wiki.example.edu").unwrap();
        let cards = service_cards(
            &[item(
                "<p>WiFi Access</p>",
                r#"<img src="/icons/wifi.svg">"#,
                r#"<a href="https://wiki.example.edu/help/network/wifi">WiFi</a>"#,
            )],
            &origin,
        );

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "WiFi Access");
        assert_eq!(cards[0].link_to, "guides/help/network/wifi");
        assert_eq!(
            cards[0].icon_src.as_deref(),
            Some("https://wiki.example.edu/icons/wifi.svg")
        );
        assert_eq!(cards[0].id, "service_wifi");
    }

    #[test]
    fn absolute_icon_sources_are_left_alone() {
        let origin = Url::parse("https://wiki.example.edu").unwrap();
        let cards = service_cards(
            &[item(
                "CDN",
                r#"<img src="https://cdn.example.net/icon.svg">"#,
                "",
            )],
            &origin,
        );
        assert_eq!(
            cards[0].icon_src.as_deref(),
            Some("https://cdn.example.net/icon.svg")
        );
    }

    #[test]
    fn only_the_first_origin_occurrence_is_rebased() {
        let origin = Url::parse("https://wiki.example.edu").unwrap();
        // The origin shows up in an attribute before the href; only that
        // first occurrence is rewritten, so the href itself survives intact.
        let cards = service_cards(
            &[item(
                "VPN",
                "",
                r#"<a data-note="https://wiki.example.edu/ignored" href="https://wiki.example.edu/help/vpn">x</a>"#,
            )],
            &origin,
        );
        assert_eq!(cards[0].link_to, "https://wiki.example.edu/help/vpn");
    }

    #[test]
    fn card_without_href_falls_back_to_positional_id() {
        let origin = Url::parse("https://wiki.example.edu").unwrap();
        let cards = service_cards(
            &[
                item("A", "", "<a>broken</a>"),
                item("B", "", r#"<a href="https://wiki.example.edu/help/vpn-2!">x</a>"#),
            ],
            &origin,
        );
        assert_eq!(cards[0].id, "service_0");
        assert_eq!(cards[0].icon_src, None);
        assert_eq!(cards[1].id, "service_vpn_2_");
    }

    #[test]
    fn search_hits_carry_the_navigation_path() {
        let hits = search_hits(vec![SearchRecord {
            title: "VPN".to_owned(),
            body: "how to".to_owned(),
            view_node: "/help/network/vpn".to_owned(),
        }]);
        assert_eq!(hits[0].path, "/help/network/vpn");
    }
}
