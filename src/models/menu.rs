//! Menu snapshot data structures.
//!
//! A `MenuSnapshot` is one immutable capture of the three-item daily menu
//! plus provenance and timestamps. Updates always construct a new snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed menu slot. The daily menu always has exactly these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
    C,
}

impl Slot {
    /// All slots in display order.
    pub const ALL: [Slot; 3] = [Slot::A, Slot::B, Slot::C];

    /// Slot letter for display and key names.
    pub fn letter(&self) -> char {
        match self {
            Slot::A => 'A',
            Slot::B => 'B',
            Slot::C => 'C',
        }
    }
}

/// One bento menu item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    /// Item name, never empty (placeholder used instead)
    pub name: String,

    /// Description or side dishes, may be empty
    #[serde(default)]
    pub description: String,

    /// Price in yen; `None` is the explicit "unknown" marker, never 0
    pub price: Option<u32>,
}

impl MenuItem {
    /// Placeholder for a slot the source could not fill.
    ///
    /// Text matches what the shop page shows when no menu is known.
    pub fn placeholder(slot: Slot) -> Self {
        Self {
            name: format!("日替わり弁当{}", slot.letter()),
            description: "本日のメニューは店頭にてご確認ください".to_string(),
            price: None,
        }
    }
}

/// Which source produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuOrigin {
    /// Spreadsheet-style structured API row
    RemoteStructured,
    /// Free-text announcement run through the extractor
    AnnouncementExtracted,
    /// Static fallback file
    LocalFile,
    /// Served from the freshness cache
    Cache,
}

impl std::fmt::Display for MenuOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MenuOrigin::RemoteStructured => "remote-structured",
            MenuOrigin::AnnouncementExtracted => "announcement-extracted",
            MenuOrigin::LocalFile => "local-file",
            MenuOrigin::Cache => "cache",
        };
        f.write_str(s)
    }
}

/// One immutable capture of the daily menu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuSnapshot {
    /// Exactly three items, in fixed slot order A, B, C
    pub items: [MenuItem; 3],

    /// When the underlying announcement was made
    pub captured_at: DateTime<Utc>,

    /// When this snapshot was obtained by the pipeline
    pub fetched_at: DateTime<Utc>,

    /// Which source produced it
    pub origin: MenuOrigin,

    /// Original announcement text, kept for audit when extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl MenuSnapshot {
    /// Item for a given slot.
    pub fn item(&self, slot: Slot) -> &MenuItem {
        match slot {
            Slot::A => &self.items[0],
            Slot::B => &self.items[1],
            Slot::C => &self.items[2],
        }
    }

    /// Copy of this snapshot re-tagged with a different origin.
    pub fn with_origin(&self, origin: MenuOrigin) -> Self {
        Self {
            origin,
            ..self.clone()
        }
    }
}

/// Flattened three-slot wire schema: `{menuA, menuB, menuC}`.
///
/// Shared by the extraction response, the sheet row mapping, and the
/// fallback file. Prices travel as digit-only strings; anything that does
/// not parse to digits means "unknown".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuPayload {
    /// Announcement date, present in the fallback file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(rename = "menuA", default, skip_serializing_if = "Option::is_none")]
    pub menu_a: Option<PayloadItem>,

    #[serde(rename = "menuB", default, skip_serializing_if = "Option::is_none")]
    pub menu_b: Option<PayloadItem>,

    #[serde(rename = "menuC", default, skip_serializing_if = "Option::is_none")]
    pub menu_c: Option<PayloadItem>,
}

/// One slot in the wire schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayloadItem {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Digit-only price string, empty when unknown
    #[serde(default)]
    pub price: String,
}

impl PayloadItem {
    fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.description.trim().is_empty()
            && parse_price(&self.price).is_none()
    }

    fn to_item(&self, slot: Slot) -> MenuItem {
        if self.name.trim().is_empty() {
            return MenuItem::placeholder(slot);
        }
        MenuItem {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: parse_price(&self.price),
        }
    }

    fn from_item(item: &MenuItem) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price.map(|p| p.to_string()).unwrap_or_default(),
        }
    }
}

impl MenuPayload {
    /// True when no slot carries any usable field.
    pub fn is_empty(&self) -> bool {
        [&self.menu_a, &self.menu_b, &self.menu_c]
            .iter()
            .all(|slot| slot.as_ref().map_or(true, PayloadItem::is_blank))
    }

    /// Map to the three fixed slots, placeholders for anything missing.
    pub fn to_items(&self) -> [MenuItem; 3] {
        [
            self.menu_a
                .as_ref()
                .map_or_else(|| MenuItem::placeholder(Slot::A), |p| p.to_item(Slot::A)),
            self.menu_b
                .as_ref()
                .map_or_else(|| MenuItem::placeholder(Slot::B), |p| p.to_item(Slot::B)),
            self.menu_c
                .as_ref()
                .map_or_else(|| MenuItem::placeholder(Slot::C), |p| p.to_item(Slot::C)),
        ]
    }

    /// Build a full snapshot from this payload.
    pub fn to_snapshot(
        &self,
        captured_at: DateTime<Utc>,
        fetched_at: DateTime<Utc>,
        origin: MenuOrigin,
        raw_text: Option<String>,
    ) -> MenuSnapshot {
        MenuSnapshot {
            items: self.to_items(),
            captured_at,
            fetched_at,
            origin,
            raw_text,
        }
    }

    /// Flatten a snapshot back into the wire schema.
    pub fn from_snapshot(snapshot: &MenuSnapshot) -> Self {
        Self {
            date: Some(snapshot.captured_at.to_rfc3339()),
            menu_a: Some(PayloadItem::from_item(snapshot.item(Slot::A))),
            menu_b: Some(PayloadItem::from_item(snapshot.item(Slot::B))),
            menu_c: Some(PayloadItem::from_item(snapshot.item(Slot::C))),
        }
    }
}

/// Parse a digit-only price string; non-digit input means unknown.
pub fn parse_price(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
