use content_rs::content::{Collection, ContentItem, DateValue};
use content_rs::{ContentError, ContentRepository, Site};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, collection: &str, name: &str, content: &str) {
    let dir = root.join(collection);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

fn slugs(items: &[ContentItem]) -> Vec<&str> {
    items.iter().map(|i| i.slug.as_str()).collect()
}

fn date_text(item: &ContentItem) -> Option<String> {
    item.metadata.date.as_ref().map(|d| match d {
        DateValue::Instant(_) => serde_json::to_value(d).unwrap().as_str().unwrap().to_string(),
        DateValue::Text(text) => text.clone(),
    })
}

#[test]
fn test_missing_items_are_none() {
    let dir = TempDir::new().unwrap();
    let repo = ContentRepository::new(dir.path());

    assert!(repo.get_page("about").unwrap().is_none());
    assert!(repo.get_news_item("launch").unwrap().is_none());
    assert!(repo.get_reference_item("house").unwrap().is_none());
    assert!(repo.get_job_item("electrician").unwrap().is_none());
    for collection in Collection::ALL {
        assert!(repo.item(collection, "nothing").unwrap().is_none());
    }
}

#[test]
fn test_missing_directory_is_empty_collection() {
    let dir = TempDir::new().unwrap();
    let repo = ContentRepository::new(dir.path().join("does-not-exist"));

    assert!(repo.get_all_pages().unwrap().is_empty());
    assert!(repo.get_all_news().unwrap().is_empty());
    assert!(repo.get_all_team().unwrap().is_empty());
}

#[test]
fn test_news_newest_first_with_canonical_dates() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "news", "a.md", "---\ntitle: A\ndate: 2024-01-01\n---\nA\n");
    write(dir.path(), "news", "b.md", "---\ntitle: B\ndate: 25.12.2024\n---\nB\n");
    write(dir.path(), "news", "c.md", "---\ntitle: C\n---\nC\n");

    let repo = ContentRepository::new(dir.path());
    let news = repo.get_all_news().unwrap();

    assert_eq!(slugs(&news), vec!["b", "a", "c"]);
    assert_eq!(date_text(&news[0]).as_deref(), Some("2024-12-25T00:00:00.000Z"));
    assert_eq!(date_text(&news[1]).as_deref(), Some("2024-01-01T00:00:00.000Z"));
    // Undated news gets the current instant
    assert!(matches!(news[2].metadata.date, Some(DateValue::Instant(_))));
}

#[test]
fn test_news_item_date_is_canonical() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "news", "launch.md", "---\ntitle: Launch\ndate: 1.3.2024\n---\nHi\n");

    let repo = ContentRepository::new(dir.path());
    let item = repo.get_news_item("launch").unwrap().unwrap();
    assert_eq!(date_text(&item).as_deref(), Some("2024-03-01T00:00:00.000Z"));

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["date"], "2024-03-01T00:00:00.000Z");
    assert_eq!(json["slug"], "launch");
    assert_eq!(json["title"], "Launch");
    assert_eq!(json["body"], "<article><p>Hi</p></article>");
}

#[test]
fn test_jobs_keep_raw_dates() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "jobs", "apprentice.md", "---\ntitle: Apprentice\n---\n");
    write(dir.path(), "jobs", "electrician.md", "---\ndate: 25.12.2024\n---\n");
    write(dir.path(), "jobs", "planner.md", "---\ndate: 2024-06-01\n---\n");

    let repo = ContentRepository::new(dir.path());
    let jobs = repo.get_all_jobs().unwrap();

    assert_eq!(slugs(&jobs), vec!["electrician", "planner", "apprentice"]);
    assert_eq!(date_text(&jobs[0]).as_deref(), Some("25.12.2024"));
    assert_eq!(date_text(&jobs[1]).as_deref(), Some("2024-06-01"));
    assert!(jobs[2].metadata.date.is_none());

    let job = repo.get_job_item("electrician").unwrap().unwrap();
    assert_eq!(date_text(&job).as_deref(), Some("25.12.2024"));
}

#[test]
fn test_references_manual_order_then_date() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "references", "a.md", "---\ndate: 2020-01-01\n---\n");
    write(dir.path(), "references", "b.md", "---\norder: 2\n---\n");
    write(dir.path(), "references", "c.md", "---\ndate: 2023-01-01\n---\n");
    write(dir.path(), "references", "d.md", "---\norder: 1\ndate: 2000-01-01\n---\n");
    write(dir.path(), "references", "e.md", "---\norder: first\ndate: 2021-01-01\n---\n");

    let repo = ContentRepository::new(dir.path());
    let refs = repo.get_all_references().unwrap();

    // Non-numeric orders count as unordered
    assert_eq!(slugs(&refs), vec!["d", "b", "c", "e", "a"]);
}

#[test]
fn test_team_order_undefined_last() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "team", "anna.md", "---\ntitle: Anna\n---\n");
    write(dir.path(), "team", "bruno.md", "---\ntitle: Bruno\norder: 2\n---\n");
    write(dir.path(), "team", "carla.md", "---\ntitle: Carla\norder: 1\n---\n");
    write(dir.path(), "team", "dario.md", "---\ntitle: Dario\n---\n");

    let repo = ContentRepository::new(dir.path());
    let team = repo.get_all_team().unwrap();
    assert_eq!(slugs(&team), vec!["carla", "bruno", "anna", "dario"]);
}

#[test]
fn test_partners_and_pages_keep_directory_order() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "partners", "zeta.md", "---\norder: 1\n---\n");
    write(dir.path(), "partners", "alpha.md", "---\norder: 2\n---\n");
    write(dir.path(), "pages", "home.md", "---\ntitle: Home\n---\n");
    write(dir.path(), "pages", "about.md", "---\ntitle: About\n---\n");

    let repo = ContentRepository::new(dir.path());
    assert_eq!(slugs(&repo.get_all_partners().unwrap()), vec!["alpha", "zeta"]);
    assert_eq!(slugs(&repo.get_all_pages().unwrap()), vec!["about", "home"]);
}

#[test]
fn test_page_blocks_default_to_empty() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "pages", "about.md", "---\ntitle: About\n---\nText\n");
    write(
        dir.path(),
        "pages",
        "home.md",
        "---\ntitle: Home\nblocks:\n  - type: hero\n    heading: Hello\n---\n",
    );

    let repo = ContentRepository::new(dir.path());
    let about = repo.get_page("about").unwrap().unwrap();
    assert_eq!(about.metadata.blocks, Some(serde_yaml::Value::Sequence(Vec::new())));
    assert_eq!(serde_json::to_value(&about).unwrap()["blocks"], serde_json::json!([]));

    let home = repo.get_page("home").unwrap().unwrap();
    let json = serde_json::to_value(&home).unwrap();
    assert_eq!(json["blocks"][0]["type"], "hero");
    assert_eq!(json["blocks"][0]["heading"], "Hello");

    // Other collections do not get blocks
    write(dir.path(), "news", "n.md", "---\ntitle: N\n---\n");
    let news = repo.get_news_item("n").unwrap().unwrap();
    assert!(news.metadata.blocks.is_none());
}

#[test]
fn test_blocks_keep_their_shape() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "pages", "home.md", "---\ntitle: Home\nblocks:\n  hero: Hello\n---\n");
    write(dir.path(), "pages", "empty.md", "---\ntitle: Empty\nblocks: ~\n---\n");
    write(dir.path(), "news", "intro.md", "---\ntitle: Intro\nblocks: intro\n---\n");

    let repo = ContentRepository::new(dir.path());
    let home = repo.get_page("home").unwrap().unwrap();
    let json = serde_json::to_value(&home).unwrap();
    assert_eq!(json["blocks"], serde_json::json!({"hero": "Hello"}));

    let empty = repo.get_page("empty").unwrap().unwrap();
    assert_eq!(serde_json::to_value(&empty).unwrap()["blocks"], serde_json::json!([]));

    let news = repo.get_all_news().unwrap();
    assert_eq!(slugs(&news), vec!["intro"]);
    assert_eq!(serde_json::to_value(&news[0]).unwrap()["blocks"], "intro");
}

#[test]
fn test_structured_title_and_excerpt_are_kept() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "team",
        "anna.md",
        "---\ntitle:\n  de: Hallo\n  en: Hello\nexcerpt:\n  de: Kurz\n---\nBody\n",
    );

    let repo = ContentRepository::new(dir.path());
    let team = repo.get_all_team().unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].title(), "anna");

    let json = serde_json::to_value(&team[0]).unwrap();
    assert_eq!(json["title"], serde_json::json!({"de": "Hallo", "en": "Hello"}));
    assert_eq!(json["excerpt"], serde_json::json!({"de": "Kurz"}));
}

#[test]
fn test_computed_fields_win_over_front_matter() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "news",
        "launch.md",
        "---\ntitle: Launch\nslug: custom\nbody: x\n---\nHi\n",
    );

    let repo = ContentRepository::new(dir.path());
    let item = repo.get_news_item("launch").unwrap().unwrap();
    let text = serde_json::to_string(&item).unwrap();
    assert_eq!(text.matches("\"slug\"").count(), 1);
    assert_eq!(text.matches("\"body\"").count(), 1);

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["slug"], "launch");
    assert_eq!(json["body"], "<article><p>Hi</p></article>");
}

#[test]
fn test_inline_tags_do_not_drop_document() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "news",
        "inline.md",
        "---\ntitle: Inline\n---\n{% if $x %}Hi{% /if %}\n",
    );

    let repo = ContentRepository::new(dir.path());
    let news = repo.get_all_news().unwrap();
    assert_eq!(slugs(&news), vec!["inline"]);
    assert_eq!(news[0].body, "<article><p>{% if $x %}Hi{% /if %}</p></article>");
}

#[test]
fn test_excerpt_from_metadata_or_body() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "news", "given.md", "---\nexcerpt: Short summary\n---\nLong body\n");
    write(dir.path(), "news", "derived.md", "---\ntitle: D\n---\n## Heading\n**Bold** text\n");

    let repo = ContentRepository::new(dir.path());
    let given = repo.get_news_item("given").unwrap().unwrap();
    assert_eq!(given.excerpt_text(), Some("Short summary"));

    let derived = repo.get_news_item("derived").unwrap().unwrap();
    assert_eq!(derived.excerpt_text(), Some(" Heading\nBold text\n..."));
}

#[test]
fn test_extra_metadata_is_preserved() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "references",
        "house.md",
        "---\ntitle: House\nlocation: Winterthur\nimages:\n  - a.jpg\n  - b.jpg\n---\n",
    );

    let repo = ContentRepository::new(dir.path());
    let item = repo.get_reference_item("house").unwrap().unwrap();
    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["location"], "Winterthur");
    assert_eq!(json["images"], serde_json::json!(["a.jpg", "b.jpg"]));
}

#[test]
fn test_links_are_rewritten_in_body() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "pages",
        "contact.md",
        "---\ntitle: Contact\n---\n[Map](www.maps.ch) and [Jobs](/jobs)\n",
    );

    let repo = ContentRepository::new(dir.path());
    let page = repo.get_page("contact").unwrap().unwrap();
    assert_eq!(
        page.body,
        "<article><p><a href=\"https://www.maps.ch\" target=\"_blank\" \
         rel=\"noopener noreferrer\">Map</a> and <a href=\"/jobs\">Jobs</a></p></article>"
    );
}

#[test]
fn test_malformed_document_skipped_in_listing() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "news", "bad.md", "---\ntitle: [oops\n---\n");
    write(dir.path(), "news", "good.md", "---\ntitle: Good\ndate: 2024-01-01\n---\n");
    write(dir.path(), "news", "broken-table.md", "---\ntitle: T\n---\n{% table %}\n* a\n");

    let repo = ContentRepository::new(dir.path());
    let news = repo.get_all_news().unwrap();
    assert_eq!(slugs(&news), vec!["good"]);

    assert!(matches!(
        repo.get_news_item("bad"),
        Err(ContentError::Document { .. })
    ));
    assert!(repo.get_news_item("broken-table").is_err());
}

#[test]
fn test_path_traversal_slugs_are_not_found() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("content");
    write(&root, "news", "ok.md", "---\ntitle: Ok\n---\n");
    write(dir.path(), "", "secret.md", "---\ntitle: Secret\n---\n");
    write(&root, "", "top.md", "---\ntitle: Top\n---\n");

    let repo = ContentRepository::new(&root);
    assert!(repo.get_news_item("ok").unwrap().is_some());
    assert!(repo.get_news_item("../top").unwrap().is_none());
    assert!(repo.get_news_item("../../secret").unwrap().is_none());
    assert!(repo.get_news_item("..").unwrap().is_none());
    assert!(repo.get_news_item("").unwrap().is_none());
}

#[test]
fn test_non_markdown_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "team", "anna.md", "---\ntitle: Anna\n---\n");
    write(dir.path(), "team", "anna.jpg", "not markdown");
    write(dir.path(), "team", ".DS_Store", "");

    let repo = ContentRepository::new(dir.path());
    assert_eq!(slugs(&repo.get_all_team().unwrap()), vec!["anna"]);
}

#[test]
fn test_site_config_timezone() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("cms.yml"),
        "content_dir: data\ntimezone: Europe/Zurich\n",
    )
    .unwrap();
    let root = dir.path().join("data");
    write(&root, "news", "summer.md", "---\ndate: 2024-07-01 12:00\n---\n");
    write(&root, "news", "winter.md", "---\ndate: 25.12.2024\n---\n");
    write(&root, "news", "iso.md", "---\ndate: 2024-03-01\n---\n");

    let site = Site::new(dir.path()).unwrap();
    let repo = site.repository().unwrap();
    let news = repo.get_all_news().unwrap();

    assert_eq!(slugs(&news), vec!["winter", "summer", "iso"]);
    assert_eq!(date_text(&news[0]).as_deref(), Some("2024-12-24T23:00:00.000Z"));
    assert_eq!(date_text(&news[1]).as_deref(), Some("2024-07-01T10:00:00.000Z"));
    // ISO date-only forms stay UTC
    assert_eq!(date_text(&news[2]).as_deref(), Some("2024-03-01T00:00:00.000Z"));
}

#[test]
fn test_site_invalid_timezone_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cms.yml"), "timezone: Mars/Olympus\n").unwrap();

    let site = Site::new(dir.path()).unwrap();
    assert!(site.repository().is_err());
}

#[test]
fn test_site_settings() {
    let dir = TempDir::new().unwrap();
    let content = dir.path().join("content");
    fs::create_dir_all(&content).unwrap();
    fs::write(
        content.join("settings.yaml"),
        "locations:\n  - name: Winterthur\n    street: Hauptstrasse 1\n    city: 8400 Winterthur\n  \
         - name: Schaffhausen\n    city: 8200 Schaffhausen\n  - name: Winterthur\nphone: 052 000 00 00\n",
    )
    .unwrap();

    let site = Site::new(dir.path()).unwrap();
    let settings = site.settings().unwrap();
    let main = settings.main_location().unwrap();
    assert_eq!(main.postal_code(), Some("8400"));
    assert_eq!(
        settings.served_areas(None, &content_rs::config::FALLBACK_AREAS),
        vec!["Winterthur", "Schaffhausen"]
    );
    assert_eq!(settings.extra["phone"], serde_yaml::Value::from("052 000 00 00"));
}
