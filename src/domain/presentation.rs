use serde::Serialize;

use super::candidate::Candidate;
use super::identity::IdentityKey;

/// Section a presented item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "label", rename_all = "lowercase")]
pub enum Section {
    Pinned,
    Recent,
    Category(String),
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Pinned => write!(f, "Pinned"),
            Section::Recent => write!(f, "Recent"),
            Section::Category(label) => write!(f, "{}", label),
        }
    }
}

/// Action the picker can offer on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    Pin,
    Unpin,
    RemoveFromHistory,
}

/// Where a presented candidate came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "candidate", rename_all = "snake_case")]
pub enum ItemSource<C> {
    /// Reported by the live catalog.
    Live(C),
    /// Revived from a history key; not currently detected.
    HistoryOnly(C),
}

/// One row of a reconciled picker list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationItem<C> {
    pub key: IdentityKey,
    pub section: Section,
    pub actions: Vec<ItemAction>,
    pub source: ItemSource<C>,
}

impl<C: Candidate> PresentationItem<C> {
    pub fn candidate(&self) -> &C {
        match &self.source {
            ItemSource::Live(c) | ItemSource::HistoryOnly(c) => c,
        }
    }

    pub fn label(&self) -> &str {
        self.candidate().display_name()
    }

    pub fn is_live(&self) -> bool {
        matches!(self.source, ItemSource::Live(_))
    }

    pub fn is_pinned(&self) -> bool {
        self.actions.contains(&ItemAction::Unpin)
    }

    pub fn has_action(&self, action: ItemAction) -> bool {
        self.actions.contains(&action)
    }
}

/// A titled run of items sharing a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationGroup<C> {
    pub section: Section,
    pub items: Vec<PresentationItem<C>>,
}

/// Why a reconciliation produced nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The catalog reported nothing and no history entry could be shown.
    CatalogEmpty,
    /// The catalog had entries but every one was filtered out.
    AllFiltered,
}

impl EmptyReason {
    /// Placeholder line shown in place of the list.
    pub fn message(&self) -> &'static str {
        match self {
            EmptyReason::CatalogEmpty => "No devices detected",
            EmptyReason::AllFiltered => "No devices match the current filters",
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Presentation<C> {
    Groups(Vec<PresentationGroup<C>>),
    Empty(EmptyReason),
}

impl<C: Candidate> Presentation<C> {
    pub fn groups(&self) -> &[PresentationGroup<C>] {
        match self {
            Presentation::Groups(groups) => groups,
            Presentation::Empty(_) => &[],
        }
    }

    /// All items in display order.
    pub fn items(&self) -> impl Iterator<Item = &PresentationItem<C>> {
        self.groups().iter().flat_map(|g| g.items.iter())
    }

    pub fn section(&self, section: &Section) -> Option<&PresentationGroup<C>> {
        self.groups().iter().find(|g| &g.section == section)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Presentation::Empty(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candidate::Port;

    fn item(source: ItemSource<Port>, actions: Vec<ItemAction>) -> PresentationItem<Port> {
        let key = match &source {
            ItemSource::Live(p) | ItemSource::HistoryOnly(p) => p.identity_key(),
        };
        PresentationItem {
            key,
            section: Section::Pinned,
            actions,
            source,
        }
    }

    #[test]
    fn test_item_accessors() {
        let live = item(
            ItemSource::Live(Port::new("serial", "COM3").with_label("Uno")),
            vec![ItemAction::Unpin],
        );
        assert!(live.is_live());
        assert!(live.is_pinned());
        assert_eq!(live.label(), "Uno");

        let stale = item(
            ItemSource::HistoryOnly(Port::new("serial", "COM4")),
            vec![ItemAction::Pin, ItemAction::RemoveFromHistory],
        );
        assert!(!stale.is_live());
        assert!(!stale.is_pinned());
        assert!(stale.has_action(ItemAction::RemoveFromHistory));
    }

    #[test]
    fn test_empty_presentation_has_no_items() {
        let presentation: Presentation<Port> = Presentation::Empty(EmptyReason::AllFiltered);
        assert!(presentation.is_empty());
        assert_eq!(presentation.items().count(), 0);
        assert_eq!(
            EmptyReason::AllFiltered.message(),
            "No devices match the current filters"
        );
    }

    #[test]
    fn test_section_display() {
        assert_eq!(Section::Pinned.to_string(), "Pinned");
        assert_eq!(Section::Category("Serial ports".into()).to_string(), "Serial ports");
    }
}
