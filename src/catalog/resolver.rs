use crate::domain::Market;
use crate::error::{Error, Result};
use crate::store::MarketStore;

/// Outcome of market resolution: the market that drives the price join (if
/// any) and the alternatives the caller may offer instead.
#[derive(Debug, Clone, Default)]
pub struct ResolvedMarkets {
    pub selected: Option<Market>,
    pub available: Vec<Market>,
}

/// Picks the market for a catalog request. An explicit identifier is strict:
/// the named market or `MarketNotFound`, never a silent fallback to the
/// hints. City/state hints are permissive; zero matches just means an
/// unscoped catalog. Hint matches come back ordered by name, so repeated
/// requests always select the same market.
pub async fn resolve_market(
    markets: &dyn MarketStore,
    explicit: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
) -> Result<ResolvedMarkets> {
    if let Some(identifier) = present(explicit) {
        let market = markets
            .find_by_identifier(identifier)
            .await?
            .ok_or_else(|| Error::MarketNotFound(identifier.to_string()))?;
        return Ok(ResolvedMarkets {
            available: vec![market.clone()],
            selected: Some(market),
        });
    }

    let city = present(city);
    let state = present(state);
    if city.is_none() && state.is_none() {
        return Ok(ResolvedMarkets::default());
    }

    let matches = markets.find_by_location(city, state).await?;
    Ok(ResolvedMarkets {
        selected: matches.first().cloned(),
        available: matches,
    })
}

/// Blank and whitespace-only parameters count as absent.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocalizedText, NewMarket};
    use crate::store::MemoryStore;

    async fn seed(store: &MemoryStore, code: &str, name: &str, city: &str, state: &str) -> Market {
        store
            .insert(&NewMarket {
                id: code.to_string(),
                name: LocalizedText::plain(name),
                city: LocalizedText::bilingual(city, format!("{city}-hi")),
                state: LocalizedText::bilingual(state, format!("{state}-hi")),
                address: "Market Yard".into(),
                contact: None,
                operating_hours: "06:00-20:00".into(),
                location: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn explicit_code_returns_that_market_only() {
        let store = MemoryStore::new();
        seed(&store, "PUNE-001", "Pune APMC", "Pune", "Maharashtra").await;
        seed(&store, "NSK-001", "Nashik APMC", "Nashik", "Maharashtra").await;

        let resolved = resolve_market(&store, Some("PUNE-001"), None, None)
            .await
            .unwrap();
        assert_eq!(resolved.selected.unwrap().code, "PUNE-001");
        assert_eq!(resolved.available.len(), 1);
    }

    #[tokio::test]
    async fn explicit_internal_key_also_resolves() {
        let store = MemoryStore::new();
        let market = seed(&store, "PUNE-001", "Pune APMC", "Pune", "Maharashtra").await;

        let resolved = resolve_market(&store, Some(&market.key.to_string()), None, None)
            .await
            .unwrap();
        assert_eq!(resolved.selected.unwrap().code, "PUNE-001");
    }

    #[tokio::test]
    async fn explicit_miss_fails_even_with_matching_hints() {
        let store = MemoryStore::new();
        seed(&store, "PUNE-001", "Pune APMC", "Pune", "Maharashtra").await;

        let err = resolve_market(&store, Some("PUNE-999"), Some("Pune"), Some("Maharashtra"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MarketNotFound(id) if id == "PUNE-999"));
    }

    #[tokio::test]
    async fn hint_ties_break_alphabetically_by_name() {
        let store = MemoryStore::new();
        seed(&store, "PUNE-B", "B-Market", "Pune", "Maharashtra").await;
        seed(&store, "PUNE-A", "A-Market", "Pune", "Maharashtra").await;

        let resolved = resolve_market(&store, None, Some("Pune"), Some("Maharashtra"))
            .await
            .unwrap();
        assert_eq!(resolved.selected.unwrap().name.primary(), "A-Market");
        let names: Vec<&str> = resolved.available.iter().map(|m| m.name.primary()).collect();
        assert_eq!(names, ["A-Market", "B-Market"]);
    }

    #[tokio::test]
    async fn hints_match_case_insensitively_and_in_hindi() {
        let store = MemoryStore::new();
        seed(&store, "PUNE-001", "Pune APMC", "Pune", "Maharashtra").await;

        let upper = resolve_market(&store, None, Some("PUNE"), None).await.unwrap();
        assert!(upper.selected.is_some());

        let hindi = resolve_market(&store, None, Some("Pune-hi"), None).await.unwrap();
        assert!(hindi.selected.is_some());
    }

    #[tokio::test]
    async fn unmatched_hints_yield_empty_availability_not_an_error() {
        let store = MemoryStore::new();
        seed(&store, "PUNE-001", "Pune APMC", "Pune", "Maharashtra").await;

        let resolved = resolve_market(&store, None, Some("Jaipur"), None).await.unwrap();
        assert!(resolved.selected.is_none());
        assert!(resolved.available.is_empty());
    }

    #[tokio::test]
    async fn no_parameters_means_unscoped() {
        let store = MemoryStore::new();
        seed(&store, "PUNE-001", "Pune APMC", "Pune", "Maharashtra").await;

        let resolved = resolve_market(&store, None, None, None).await.unwrap();
        assert!(resolved.selected.is_none());
        assert!(resolved.available.is_empty());

        // Whitespace-only values behave the same way.
        let resolved = resolve_market(&store, Some("  "), Some(""), None).await.unwrap();
        assert!(resolved.selected.is_none());
    }
}
