//! Show site settings

use anyhow::Result;

use crate::config::FALLBACK_AREAS;
use crate::Site;

/// Print the main address and the served areas
pub fn run(site: &Site) -> Result<()> {
    let settings = site.settings()?;

    match settings.main_location() {
        Some(location) => {
            println!("Main location: {}", location.name);
            if let Some(street) = &location.street {
                println!("  Street: {}", street);
            }
            if let Some(city) = &location.city {
                println!("  City: {}", city);
            }
            if let Some(code) = location.postal_code() {
                println!("  Postal code: {}", code);
            }
        }
        None => println!("Main location: -"),
    }

    let areas = settings.served_areas(None, &FALLBACK_AREAS);
    println!("Areas served ({}): {}", areas.len(), areas.join(", "));

    Ok(())
}
