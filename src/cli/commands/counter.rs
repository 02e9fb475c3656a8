//! Visitor counter commands.

use console::style;

use horse::enhance::{format_count, parse_visit_count};
use horse::store::{KeyValueStore, SqliteStore};
use horse::{Config, Settings};

/// The count a stored value will render as on the next page, before the
/// visit's own increment.
fn display_count(value: &str, width: usize) -> Option<String> {
    parse_visit_count(value).map(|count| format_count(count, width))
}

/// Show the stored visitor count.
pub fn cmd_counter_show(config: &Config, settings: &Settings) -> anyhow::Result<()> {
    let store = SqliteStore::open(&settings.storage_path)?;

    match store.get(&config.counter.key)? {
        Some(value) => match display_count(&value, config.counter.width) {
            Some(count) => println!("{}", count),
            None => println!(
                "{} Stored value {:?} is not a number; the next visit will reseed",
                style("!").yellow(),
                value
            ),
        },
        None => println!(
            "{} No visits recorded in {}",
            style("!").yellow(),
            settings.storage_path.display()
        ),
    }
    Ok(())
}

/// Remove the stored visitor count.
pub fn cmd_counter_reset(config: &Config, settings: &Settings) -> anyhow::Result<()> {
    let store = SqliteStore::open(&settings.storage_path)?;
    store.remove(&config.counter.key)?;
    println!("{} Visitor count reset", style("✓").green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_count_matches_page_parse() {
        assert_eq!(display_count("41", 7).as_deref(), Some("0000041"));
        assert_eq!(display_count("41abc", 7).as_deref(), Some("0000041"));
        assert_eq!(display_count(" 5000 ", 7).as_deref(), Some("0005000"));
        assert_eq!(display_count("lots", 7), None);
    }
}
