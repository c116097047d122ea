use std::collections::HashMap;
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

/// Raw sidebar menu document as shipped by the backend: a forest of nodes,
/// each carrying a navigation path and the opaque content identifier used to
/// fetch the article body.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMenuNode {
    pub title: String,
    pub link: String,
    #[serde(rename = "uuid")]
    pub identifier: String,
    #[serde(default)]
    pub children: Vec<RawMenuNode>,
}

/// One entry of the loaded menu arena.
#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub title: String,
    pub link: String,
    pub identifier: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// One step of a breadcrumb trail, root to leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub title: String,
    pub path: String,
    pub identifier: String,
}

/// The navigation menu, loaded once at startup and immutable afterwards.
///
/// Nodes live in a flat arena with parent/child indices and a link index, so
/// lookups and breadcrumb construction never re-walk nested JSON.
#[derive(Debug, Clone)]
pub struct MenuTree {
    nodes: Vec<MenuEntry>,
    by_link: HashMap<String, usize>,
    roots: Vec<usize>,
}

impl MenuTree {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let raw: Vec<RawMenuNode> = serde_json::from_str(json).context("parse menu json")?;
        Self::from_raw(raw)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read menu: {}", path.display()))?;
        Self::from_json(&json)
    }

    /// The menu bundled with the client, used when no external menu document
    /// is configured.
    pub fn bundled() -> anyhow::Result<Self> {
        Self::from_json(include_str!("../assets/menu.json")).context("load bundled menu")
    }

    pub fn from_raw(raw: Vec<RawMenuNode>) -> anyhow::Result<Self> {
        let mut tree = Self {
            nodes: Vec::new(),
            by_link: HashMap::new(),
            roots: Vec::new(),
        };
        for node in raw {
            let index = tree.insert(node, None)?;
            tree.roots.push(index);
        }
        Ok(tree)
    }

    fn insert(&mut self, raw: RawMenuNode, parent: Option<usize>) -> anyhow::Result<usize> {
        let index = self.nodes.len();
        if self.by_link.insert(raw.link.clone(), index).is_some() {
            anyhow::bail!("duplicate menu link: {}", raw.link);
        }
        self.nodes.push(MenuEntry {
            title: raw.title,
            link: raw.link,
            identifier: raw.identifier,
            parent,
            children: Vec::new(),
        });
        for child in raw.children {
            let child_index = self.insert(child, Some(index))?;
            self.nodes[index].children.push(child_index);
        }
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find_by_link(&self, link: &str) -> Option<&MenuEntry> {
        self.by_link.get(link).map(|&index| &self.nodes[index])
    }

    pub fn roots(&self) -> impl Iterator<Item = &MenuEntry> {
        self.roots.iter().map(|&index| &self.nodes[index])
    }

    pub fn children(&self, entry: &MenuEntry) -> impl Iterator<Item = &MenuEntry> {
        entry.children.iter().map(|&index| &self.nodes[index])
    }

    /// Ancestor chain for `link`, root first, the node itself last. `None`
    /// when the link is not part of the menu.
    pub fn breadcrumbs(&self, link: &str) -> Option<Vec<Crumb>> {
        let mut index = *self.by_link.get(link)?;
        let mut trail = Vec::new();
        loop {
            let entry = &self.nodes[index];
            trail.push(Crumb {
                title: entry.title.clone(),
                path: entry.link.clone(),
                identifier: entry.identifier.clone(),
            });
            match entry.parent {
                Some(parent) => index = parent,
                None => break,
            }
        }
        trail.reverse();
        Some(trail)
    }
}
