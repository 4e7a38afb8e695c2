use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::app::constraints::ConstraintSet;
use crate::domain::{
    Candidate, EmptyReason, HistoryConfig, IdentityKey, ItemAction, ItemSource, Presentation,
    PresentationGroup, PresentationItem, Section,
};

/// Builds picker lists from a catalog snapshot and the two history lists.
///
/// Holds configuration only; every call works on its own inputs, so
/// overlapping calls cannot observe each other.
#[derive(Debug, Clone)]
pub struct Reconciler {
    recent_display_cap: usize,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl Reconciler {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            recent_display_cap: config.recent_display_cap,
        }
    }

    pub fn recent_display_cap(&self) -> usize {
        self.recent_display_cap
    }

    /// Merge the live `catalog` with `pinned` and `recent` keys.
    ///
    /// Output order is pinned, then recent (at most `recent_display_cap`
    /// entries, never repeating a pinned key), then the remaining live
    /// candidates grouped by category in discovery order. History entries
    /// absent from the catalog are revived from their key and must pass the
    /// same constraints; entries that cannot be revived are skipped. A
    /// history key whose catalog candidate was rejected is skipped, never
    /// revived. The recent cap counts shown entries only.
    pub async fn reconcile<C: Candidate>(
        &self,
        catalog: &[C],
        pinned: &[IdentityKey],
        recent: &[IdentityKey],
        constraints: &ConstraintSet<C>,
    ) -> Presentation<C> {
        let accepted: Vec<(IdentityKey, &C)> = constraints
            .filter(catalog)
            .await
            .into_iter()
            .map(|c| (c.identity_key(), c))
            .collect();

        let in_catalog: HashSet<IdentityKey> = catalog.iter().map(|c| c.identity_key()).collect();
        let mut live: HashMap<&IdentityKey, &C> = HashMap::with_capacity(accepted.len());
        for (key, candidate) in &accepted {
            live.entry(key).or_insert(*candidate);
        }

        let pinned_set: HashSet<&IdentityKey> = pinned.iter().collect();
        let recent_set: HashSet<&IdentityKey> = recent.iter().collect();
        let actions = |key: &IdentityKey| {
            let mut actions = Vec::with_capacity(2);
            if pinned_set.contains(key) {
                actions.push(ItemAction::Unpin);
            } else {
                actions.push(ItemAction::Pin);
            }
            if recent_set.contains(key) {
                actions.push(ItemAction::RemoveFromHistory);
            }
            actions
        };

        let mut shown: HashSet<IdentityKey> = HashSet::new();
        let pinned_keys = dedup(pinned.iter(), &HashSet::new());
        let recent_keys = dedup(recent.iter(), &pinned_set);

        let mut groups = Vec::new();
        for (section, keys, limit) in [
            (Section::Pinned, pinned_keys, usize::MAX),
            (Section::Recent, recent_keys, self.recent_display_cap),
        ] {
            let mut items = Vec::new();
            for key in keys {
                if items.len() >= limit {
                    break;
                }
                let Some(source) = Self::resolve(key, &live, &in_catalog, constraints).await
                else {
                    continue;
                };
                shown.insert(key.clone());
                items.push(PresentationItem {
                    key: key.clone(),
                    section: section.clone(),
                    actions: actions(key),
                    source,
                });
            }
            if !items.is_empty() {
                groups.push(PresentationGroup { section, items });
            }
        }

        let mut category_index: HashMap<String, usize> = HashMap::new();
        let mut categories: Vec<PresentationGroup<C>> = Vec::new();
        for (key, candidate) in &accepted {
            if !shown.insert(key.clone()) {
                continue;
            }
            let section = Section::Category(candidate.category());
            let item = PresentationItem {
                key: key.clone(),
                section: section.clone(),
                actions: actions(key),
                source: ItemSource::Live((*candidate).clone()),
            };
            let index = *category_index
                .entry(candidate.category())
                .or_insert_with(|| {
                    categories.push(PresentationGroup {
                        section,
                        items: Vec::new(),
                    });
                    categories.len() - 1
                });
            categories[index].items.push(item);
        }
        groups.extend(categories);

        if groups.is_empty() {
            let reason = if catalog.is_empty() {
                EmptyReason::CatalogEmpty
            } else {
                EmptyReason::AllFiltered
            };
            debug!(catalog = catalog.len(), ?reason, "Nothing to present");
            return Presentation::Empty(reason);
        }

        Presentation::Groups(groups)
    }

    async fn resolve<C: Candidate>(
        key: &IdentityKey,
        live: &HashMap<&IdentityKey, &C>,
        in_catalog: &HashSet<IdentityKey>,
        constraints: &ConstraintSet<C>,
    ) -> Option<ItemSource<C>> {
        if let Some(candidate) = live.get(key) {
            return Some(ItemSource::Live((*candidate).clone()));
        }
        if in_catalog.contains(key) {
            debug!(key = %key, "History entry is connected but filtered out, skipping");
            return None;
        }

        let Some(stand_in) = C::from_identity_key(key) else {
            debug!(key = %key, "History key cannot be decoded, skipping");
            return None;
        };
        if !constraints.evaluate(&stand_in).await {
            debug!(key = %key, "History entry rejected by constraints, skipping");
            return None;
        }
        Some(ItemSource::HistoryOnly(stand_in))
    }
}

/// Stable de-duplication (first occurrence wins), skipping `exclude`.
fn dedup<'a>(
    keys: impl Iterator<Item = &'a IdentityKey>,
    exclude: &HashSet<&IdentityKey>,
) -> Vec<&'a IdentityKey> {
    let mut seen = HashSet::new();
    keys.filter(|key| !exclude.contains(key) && seen.insert(*key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Port;
    use crate::ports::FnConstraint;

    fn serial(address: &str) -> Port {
        Port::new("serial", address)
            .with_label(format!("{} (Serial)", address))
            .with_protocol_label("Serial ports")
    }

    fn network(address: &str) -> Port {
        Port::new("network", address).with_protocol_label("Network ports")
    }

    fn keys(ports: &[Port]) -> Vec<IdentityKey> {
        ports.iter().map(|p| p.identity_key()).collect()
    }

    fn addresses(group: &PresentationGroup<Port>) -> Vec<&str> {
        group.items.iter().map(|i| i.candidate().address.as_str()).collect()
    }

    #[tokio::test]
    async fn test_catalog_grouped_by_category() {
        let catalog = vec![serial("COM1"), network("10.0.0.2"), serial("COM2")];
        let presentation = Reconciler::default()
            .reconcile(&catalog, &[], &[], &ConstraintSet::new())
            .await;

        let groups = presentation.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].section, Section::Category("Serial ports".to_string()));
        assert_eq!(addresses(&groups[0]), ["COM1", "COM2"]);
        assert_eq!(groups[1].section, Section::Category("Network ports".to_string()));
        assert!(presentation.items().all(|i| i.actions == vec![ItemAction::Pin]));
    }

    #[tokio::test]
    async fn test_pinned_and_recent_come_first() {
        let catalog = vec![serial("COM1"), serial("COM2"), serial("COM3")];
        let pinned = keys(&[serial("COM3")]);
        let recent = keys(&[serial("COM2")]);

        let presentation = Reconciler::default()
            .reconcile(&catalog, &pinned, &recent, &ConstraintSet::new())
            .await;
        let groups = presentation.groups();

        assert_eq!(groups[0].section, Section::Pinned);
        assert_eq!(addresses(&groups[0]), ["COM3"]);
        assert_eq!(groups[0].items[0].actions, vec![ItemAction::Unpin]);

        assert_eq!(groups[1].section, Section::Recent);
        assert_eq!(addresses(&groups[1]), ["COM2"]);
        assert_eq!(
            groups[1].items[0].actions,
            vec![ItemAction::Pin, ItemAction::RemoveFromHistory]
        );

        assert_eq!(addresses(&groups[2]), ["COM1"]);
    }

    #[tokio::test]
    async fn test_key_in_both_lists_shown_once_as_pinned() {
        let catalog = vec![serial("COM1")];
        let both = keys(&[serial("COM1")]);

        let presentation = Reconciler::default()
            .reconcile(&catalog, &both, &both, &ConstraintSet::new())
            .await;

        let items: Vec<_> = presentation.items().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].section, Section::Pinned);
        assert_eq!(
            items[0].actions,
            vec![ItemAction::Unpin, ItemAction::RemoveFromHistory]
        );
    }

    #[tokio::test]
    async fn test_duplicate_history_keys_collapse() {
        let catalog = vec![serial("COM1"), serial("COM2")];
        let pinned = keys(&[serial("COM1"), serial("COM1")]);
        let recent = keys(&[serial("COM2"), serial("COM2")]);

        let presentation = Reconciler::default()
            .reconcile(&catalog, &pinned, &recent, &ConstraintSet::new())
            .await;
        assert_eq!(presentation.items().count(), 2);
    }

    #[tokio::test]
    async fn test_empty_catalog_revives_history() {
        let pinned = keys(&[serial("COM7")]);
        let recent = keys(&[network("10.0.0.9")]);

        let presentation = Reconciler::default()
            .reconcile::<Port>(&[], &pinned, &recent, &ConstraintSet::new())
            .await;

        let items: Vec<_> = presentation.items().collect();
        assert_eq!(items.len(), 2);
        for item in &items {
            assert!(!item.is_live());
            assert!(!item.candidate().is_detected());
            assert!(matches!(item.source, ItemSource::HistoryOnly(_)));
        }
        assert_eq!(items[0].candidate().address, "COM7");
        assert_eq!(items[1].candidate().address, "10.0.0.9");
    }

    #[tokio::test]
    async fn test_recent_display_cap_is_separate_from_retention() {
        let catalog: Vec<Port> = (1..=5).map(|i| serial(&format!("COM{}", i))).collect();
        let recent = keys(&catalog);

        let presentation = Reconciler::default()
            .reconcile(&catalog, &[], &recent, &ConstraintSet::new())
            .await;
        let recent_group = presentation.section(&Section::Recent).unwrap();
        assert_eq!(addresses(recent_group), ["COM1", "COM2", "COM3"]);

        // Overflow stays live and is listed under its category, still removable.
        let serial_group = presentation
            .section(&Section::Category("Serial ports".to_string()))
            .unwrap();
        assert_eq!(addresses(serial_group), ["COM4", "COM5"]);
        assert!(serial_group
            .items
            .iter()
            .all(|i| i.has_action(ItemAction::RemoveFromHistory)));
    }

    #[tokio::test]
    async fn test_pinned_keys_do_not_consume_recent_slots() {
        let catalog: Vec<Port> = (1..=4).map(|i| serial(&format!("COM{}", i))).collect();
        let pinned = keys(&catalog[..1]);
        let recent = keys(&catalog);

        let presentation = Reconciler::default()
            .reconcile(&catalog, &pinned, &recent, &ConstraintSet::new())
            .await;
        let recent_group = presentation.section(&Section::Recent).unwrap();
        assert_eq!(addresses(recent_group), ["COM2", "COM3", "COM4"]);
    }

    #[tokio::test]
    async fn test_constraints_apply_to_revived_entries() {
        let constraints = ConstraintSet::new().with(FnConstraint::new("serial-only", |p: &Port| {
            Ok(p.protocol == "serial")
        }));
        let pinned = keys(&[network("10.0.0.9"), serial("COM7")]);

        let presentation = Reconciler::default()
            .reconcile::<Port>(&[], &pinned, &[], &constraints)
            .await;
        let items: Vec<_> = presentation.items().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].candidate().address, "COM7");
    }

    #[tokio::test]
    async fn test_rejected_live_entry_is_not_revived() {
        let board_port = serial("COM1").with_property("vid", "0x2341");
        let constraints = ConstraintSet::new().with(FnConstraint::new("no-arduino", |p: &Port| {
            Ok(p.properties.get("vid").map(String::as_str) != Some("0x2341"))
        }));
        let pinned = keys(&[board_port.clone()]);

        let presentation = Reconciler::default()
            .reconcile(&[board_port], &pinned, &pinned, &constraints)
            .await;
        assert_eq!(presentation, Presentation::Empty(EmptyReason::AllFiltered));
    }

    #[tokio::test]
    async fn test_recent_cap_counts_shown_entries_only() {
        let catalog = vec![serial("COM1")];
        let recent = vec![
            IdentityKey::new("stale-1"),
            IdentityKey::new("stale-2"),
            IdentityKey::new("stale-3"),
            serial("COM1").identity_key(),
        ];

        let presentation = Reconciler::default()
            .reconcile(&catalog, &[], &recent, &ConstraintSet::new())
            .await;
        let recent_group = presentation.section(&Section::Recent).unwrap();
        assert_eq!(addresses(recent_group), ["COM1"]);
        assert!(recent_group.items[0].is_live());
        assert_eq!(presentation.groups().len(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_history_is_skipped() {
        let catalog = vec![serial("COM1")];
        let pinned = vec![IdentityKey::new("not a key"), serial("COM1").identity_key()];

        let presentation = Reconciler::default()
            .reconcile(&catalog, &pinned, &[], &ConstraintSet::new())
            .await;
        let items: Vec<_> = presentation.items().collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_live());
    }

    #[tokio::test]
    async fn test_empty_reasons() {
        let reconciler = Reconciler::default();
        let reject_all = ConstraintSet::new().with(FnConstraint::new("none", |_: &Port| Ok(false)));

        let empty = reconciler
            .reconcile::<Port>(&[], &[], &[], &ConstraintSet::new())
            .await;
        assert_eq!(empty, Presentation::Empty(EmptyReason::CatalogEmpty));

        let filtered = reconciler
            .reconcile(&[serial("COM1")], &[], &[], &reject_all)
            .await;
        assert_eq!(filtered, Presentation::Empty(EmptyReason::AllFiltered));

        let unrevivable = reconciler
            .reconcile::<Port>(&[], &[IdentityKey::new("garbage")], &[], &ConstraintSet::new())
            .await;
        assert_eq!(unrevivable, Presentation::Empty(EmptyReason::CatalogEmpty));
    }

    #[tokio::test]
    async fn test_duplicate_catalog_entries_listed_once() {
        let catalog = vec![serial("COM1"), serial("COM1").with_label("Uno")];
        let presentation = Reconciler::default()
            .reconcile(&catalog, &[], &[], &ConstraintSet::new())
            .await;
        let items: Vec<_> = presentation.items().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label(), "COM1 (Serial)");
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let catalog = vec![serial("COM1"), network("10.0.0.2")];
        let pinned = keys(&[network("10.0.0.2"), serial("COM9")]);
        let recent = keys(&[serial("COM1")]);
        let reconciler = Reconciler::default();
        let constraints = ConstraintSet::new();

        let first = reconciler.reconcile(&catalog, &pinned, &recent, &constraints).await;
        let second = reconciler.reconcile(&catalog, &pinned, &recent, &constraints).await;
        assert_eq!(first, second);
    }
}
