//! Fake visitor counter.
//!
//! Keeps a plausible-looking hit count in a [`KeyValueStore`]. The first
//! visit seeds a number in the configured range, and every counter element
//! on a page bumps it by one. Reads and writes are not atomic: concurrent
//! visits can lose an increment, which is harmless for a decorative number.

use rand::Rng;
use tracing::{debug, warn};

use crate::config::CounterConfig;
use crate::dom::Document;
use crate::store::KeyValueStore;

/// Class marking counter elements.
pub const COUNTER_CLASS: &str = "visitor-counter";

/// Parse a stored count the way a lenient integer parse would: leading
/// whitespace is skipped and trailing garbage ignored. Anything without
/// leading digits (including negatives) counts as absent. Values too large
/// for a `u64` saturate so the count never goes backwards.
pub fn parse_visit_count(value: &str) -> Option<u64> {
    let trimmed = value.trim_start();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let digits = &trimmed[..digits_end];
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Read the stored count, seeding it if missing or unreadable, then
/// increment, persist and return the new value.
pub fn next_visit<R>(store: &dyn KeyValueStore, config: &CounterConfig, rng: &mut R) -> u64
where
    R: Rng,
{
    let stored = match store.get(&config.key) {
        Ok(value) => value.as_deref().and_then(parse_visit_count),
        Err(e) => {
            debug!("Visitor count unreadable, reseeding: {}", e);
            None
        }
    };

    let current = stored.unwrap_or_else(|| {
        let seed = config.seed_base + rng.gen_range(0..config.seed_span.max(1));
        debug!("Seeding visitor count at {}", seed);
        seed
    });
    let next = current.saturating_add(1);

    if let Err(e) = store.set(&config.key, &next.to_string()) {
        warn!("[horse] failed to store visitor count: {}", e);
    }
    next
}

/// Zero-pad a count to the configured width.
pub fn format_count(count: u64, width: usize) -> String {
    format!("{:0width$}", count, width = width)
}

/// Fill every `.visitor-counter` element. Each element takes its own turn
/// at the counter. Returns the number of elements updated.
pub fn init_visitor_counters<R>(
    document: &mut Document,
    store: &dyn KeyValueStore,
    config: &CounterConfig,
    rng: &mut R,
) -> usize
where
    R: Rng,
{
    let counters = match document.query_all(&format!(".{}", COUNTER_CLASS)) {
        Ok(found) => found,
        Err(e) => {
            warn!("[horse] {}", e);
            return 0;
        }
    };
    for &element in &counters {
        let count = next_visit(store, config, rng);
        document.set_text(element, &format_count(count, config.width));
    }
    counters.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError, StoreResult};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const PAGE: &str = r#"<html><body><span class="visitor-counter">0000000</span></body></html>"#;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Err(StoreError::Io(std::io::Error::other("disk on fire")))
        }
        fn set(&self, _key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::other("disk on fire")))
        }
        fn remove(&self, _key: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    fn counter_text(doc: &Document) -> String {
        let el = doc.query_all(".visitor-counter").unwrap()[0];
        doc.text_content(el)
    }

    #[test]
    fn test_first_visit_seeds_in_range() {
        let config = CounterConfig::default();
        for seed in 0..50 {
            let store = MemoryStore::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut doc = Document::parse(PAGE);

            assert_eq!(init_visitor_counters(&mut doc, &store, &config, &mut rng), 1);

            let text = counter_text(&doc);
            assert_eq!(text.len(), 7);
            let n: u64 = text.parse().unwrap();
            assert!((4828..=5027).contains(&n), "out of range: {n}");
            assert_eq!(store.get("horse_visitors").unwrap(), Some(n.to_string()));
        }
    }

    #[test]
    fn test_second_visit_increments_by_one() {
        let config = CounterConfig::default();
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(7);

        let mut first = Document::parse(PAGE);
        init_visitor_counters(&mut first, &store, &config, &mut rng);
        let stored: u64 = store.get("horse_visitors").unwrap().unwrap().parse().unwrap();

        let mut second = Document::parse(PAGE);
        init_visitor_counters(&mut second, &store, &config, &mut rng);

        assert_eq!(counter_text(&second), format_count(stored + 1, 7));
    }

    #[test]
    fn test_unparsable_value_reseeds() {
        let config = CounterConfig::default();
        let store = MemoryStore::new().with_value("horse_visitors", "lots");
        let mut rng = StdRng::seed_from_u64(1);

        let n = next_visit(&store, &config, &mut rng);
        assert!((4828..=5027).contains(&n));
    }

    #[test]
    fn test_lenient_parse_of_stored_value() {
        assert_eq!(parse_visit_count("41"), Some(41));
        assert_eq!(parse_visit_count("  41abc"), Some(41));
        assert_eq!(parse_visit_count("-3"), None);
        assert_eq!(parse_visit_count(""), None);
        assert_eq!(parse_visit_count("abc"), None);
    }

    #[test]
    fn test_huge_stored_value_saturates_instead_of_reseeding() {
        assert_eq!(parse_visit_count("99999999999999999999999"), Some(u64::MAX));

        let config = CounterConfig::default();
        let store = MemoryStore::new().with_value("horse_visitors", "99999999999999999999999");
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(next_visit(&store, &config, &mut rng), u64::MAX);
        assert_eq!(
            store.get("horse_visitors").unwrap(),
            Some(u64::MAX.to_string())
        );
    }

    #[test]
    fn test_each_element_takes_a_turn() {
        let config = CounterConfig::default();
        let store = MemoryStore::new().with_value("horse_visitors", "100");
        let mut rng = StdRng::seed_from_u64(3);
        let mut doc = Document::parse(
            r#"<html><body><b class="visitor-counter"></b><i class="big visitor-counter"></i></body></html>"#,
        );

        assert_eq!(init_visitor_counters(&mut doc, &store, &config, &mut rng), 2);

        let els = doc.query_all(".visitor-counter").unwrap();
        assert_eq!(doc.text_content(els[0]), "0000101");
        assert_eq!(doc.text_content(els[1]), "0000102");
        assert_eq!(store.get("horse_visitors").unwrap().as_deref(), Some("102"));
    }

    #[test]
    fn test_store_failure_still_renders() {
        let config = CounterConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut doc = Document::parse(PAGE);

        init_visitor_counters(&mut doc, &BrokenStore, &config, &mut rng);

        let n: u64 = counter_text(&doc).parse().unwrap();
        assert!((4828..=5027).contains(&n));
    }

    #[test]
    fn test_format_count_does_not_truncate() {
        assert_eq!(format_count(42, 7), "0000042");
        assert_eq!(format_count(123456789, 7), "123456789");
    }

    #[test]
    fn test_no_counters_leaves_store_alone() {
        let store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(0);
        let mut doc = Document::parse("<html><body></body></html>");

        assert_eq!(
            init_visitor_counters(&mut doc, &store, &CounterConfig::default(), &mut rng),
            0
        );
        assert_eq!(store.get("horse_visitors").unwrap(), None);
    }
}
