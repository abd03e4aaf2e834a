//! List collection content

use anyhow::{anyhow, Result};

use crate::content::Collection;
use crate::helpers::format_date;
use crate::Site;

/// List a collection, one line per item in collection order
pub fn run(site: &Site, collection: &str) -> Result<()> {
    let collection: Collection = collection.parse().map_err(|e: String| anyhow!(e))?;
    let repository = site.repository()?;
    let items = repository.collection(collection)?;

    println!("{} ({}):", capitalize(collection.dir_name()), items.len());
    for item in items {
        let date = match &item.metadata.date {
            Some(date) => {
                let instant = repository.normalizer().normalize(Some(date));
                format_date(&instant, &site.config.date_format)
            }
            None => "-".to_string(),
        };
        let order = item
            .metadata
            .order
            .map(|o| format!(" #{}", o))
            .unwrap_or_default();
        println!("  {} - {}{} [{}]", date, item.title(), order, item.slug);
    }

    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
