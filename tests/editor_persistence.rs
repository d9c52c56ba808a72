mod support;

use brandpage::application::product_designs::{ProductDesignError, SaveDesignCommand};
use brandpage::domain::blocks::{BlockContent, HeroContent, TextContent};
use brandpage::domain::entities::PageSettings;
use brandpage::domain::types::BlockKind;
use brandpage::presentation::blocks::{render_block, render_page_components};
use serde_json::json;

use support::{InMemoryRepos, router_state, seed_brand, seed_page};

#[tokio::test]
async fn landing_page_blocks_survive_save_and_reload() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "launch", true).await;
    let pages = &state.api.landing_pages;

    let mut editor = pages.load_editor(&owner, page.id).await.expect("editor loads");
    assert!(editor.is_empty());

    let hero = editor.add(BlockKind::Hero, Some(brand.id));
    let text = editor.add(BlockKind::Text, Some(brand.id));
    let divider = editor.add(BlockKind::Divider, Some(brand.id));
    editor
        .update(
            hero,
            Some(BlockContent::Hero(HeroContent {
                title: "Spring drop".into(),
                subtitle: "Limited run".into(),
                button_text: "Shop".into(),
                button_link: "https://example.com/shop".into(),
                ..HeroContent::default()
            })),
            None,
        )
        .expect("hero updates");
    editor
        .update(
            text,
            Some(BlockContent::Text(TextContent {
                text: "Handmade in small batches.".into(),
                ..TextContent::default()
            })),
            None,
        )
        .expect("text updates");
    editor.move_to(divider, 0).expect("divider moves");

    pages
        .save_editor(&owner, page.id, &editor)
        .await
        .expect("editor saves");
    let reloaded = pages.load_editor(&owner, page.id).await.expect("reloads");
    assert_eq!(reloaded.blocks(), editor.blocks());
    assert_eq!(reloaded.blocks()[0].kind(), BlockKind::Divider);

    let mut trimmed = reloaded;
    trimmed.delete(text).expect("text deletes");
    pages
        .save_editor(&owner, page.id, &trimmed)
        .await
        .expect("trimmed editor saves");

    let stored = pages.get(&owner, page.id).await.expect("page loads");
    let positions: Vec<i32> = stored.components.iter().map(|row| row.position).collect();
    assert_eq!(positions, vec![0, 1]);

    let html = render_page_components(&stored.components).join("\n");
    assert!(html.contains("Spring drop"));
    assert!(!html.contains("small batches"));
}

#[tokio::test]
async fn submitted_components_replace_previous_rows() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "launch", true).await;
    let pages = &state.api.landing_pages;

    let inputs = serde_json::from_value(json!([
        {"type": "HEADING", "content": {"text": "Hello", "level": 2}},
        {"type": "TEXT", "content": {"text": "First"}, "isActive": false}
    ]))
    .expect("inputs decode");
    pages
        .save_components(&owner, page.id, inputs)
        .await
        .expect("first save");

    let replacement = serde_json::from_value(json!([
        {"type": "BUTTON", "content": {"text": "Buy", "link": "https://example.com"}}
    ]))
    .expect("inputs decode");
    let rows = pages
        .save_components(&owner, page.id, replacement)
        .await
        .expect("second save");

    assert_eq!(rows.len(), 1);
    let stored = pages.get(&owner, page.id).await.expect("page loads");
    assert_eq!(stored.components, rows);
    assert_eq!(stored.components[0].component_type, "BUTTON");
}

#[tokio::test]
async fn submitted_content_and_styles_are_stored_as_sent() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let brand = seed_brand(&state, &owner, "Acme").await;
    let page = seed_page(&state, &owner, brand.id, "launch", true).await;
    let pages = &state.api.landing_pages;

    let submitted = vec![
        (
            "HERO",
            json!({"title": "Hi", "backgroundImage": "/uploads/public/x.png"}),
            json!({"opacity": 0.5, "textAlign": "center"}),
        ),
        (
            "FEATURES",
            json!({"items": [{"title": "Fast", "badge": "new"}], "columns": 3}),
            json!({}),
        ),
        ("DIVIDER", json!({"thickness": 2}), json!({"margin": "2rem 0"})),
    ];
    let inputs = serde_json::from_value(json!(
        submitted
            .iter()
            .map(|(kind, content, styles)| json!({
                "type": kind,
                "content": content,
                "styles": styles,
            }))
            .collect::<Vec<_>>()
    ))
    .expect("inputs decode");
    pages
        .save_components(&owner, page.id, inputs)
        .await
        .expect("components save");

    let stored = pages.get(&owner, page.id).await.expect("page loads");
    let tuples: Vec<_> = stored
        .components
        .iter()
        .map(|row| {
            (
                row.component_type.as_str(),
                row.content.clone(),
                row.styles.clone(),
            )
        })
        .collect();
    assert_eq!(tuples, submitted);

    let editor = pages.load_editor(&owner, page.id).await.expect("reloads");
    pages
        .save_editor(&owner, page.id, &editor)
        .await
        .expect("editor saves");
    let resaved = pages.get(&owner, page.id).await.expect("page loads");
    assert_eq!(resaved.components, stored.components);
}

#[tokio::test]
async fn design_document_survives_save_and_reload() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let owner = repos.sign_in("owner-token").await;
    let designs = &state.api.designs;

    let design = designs
        .create(
            &owner,
            SaveDesignCommand {
                title: "Mug".into(),
                product_id: None,
                components: Vec::new(),
                page_settings: None,
                published: false,
            },
        )
        .await
        .expect("design created");

    let (mut editor, settings) = designs
        .load_editor(&owner, design.id)
        .await
        .expect("editor loads");
    assert!(editor.is_empty());
    assert_eq!(settings, PageSettings::default());

    editor.add(BlockKind::Image, None);
    let features = editor.add(BlockKind::Features, None);
    editor.add(BlockKind::Testimonials, None);
    editor.toggle_active(features).expect("toggles");

    let settings = PageSettings {
        background_color: "#fafafa".into(),
        ..PageSettings::default()
    };
    designs
        .save_editor(&owner, design.id, &editor, settings.clone())
        .await
        .expect("design saves");

    let (reloaded, reloaded_settings) = designs
        .load_editor(&owner, design.id)
        .await
        .expect("reloads");
    assert_eq!(reloaded.blocks(), editor.blocks());
    assert_eq!(reloaded_settings, settings);
}

#[tokio::test]
async fn designs_are_private_to_their_author() {
    let repos = InMemoryRepos::new();
    let (state, _uploads) = router_state(repos.clone());
    let author = repos.sign_in("author-token").await;
    let stranger = repos.sign_in("stranger-token").await;

    let design = state
        .api
        .designs
        .create(
            &author,
            SaveDesignCommand {
                title: "Tote".into(),
                product_id: None,
                components: Vec::new(),
                page_settings: None,
                published: true,
            },
        )
        .await
        .expect("design created");

    let err = state
        .api
        .designs
        .get(&stranger, design.id)
        .await
        .expect_err("stranger is rejected");
    assert!(matches!(err, ProductDesignError::Forbidden));
}

#[test]
fn every_block_kind_renders_from_empty_content() {
    for kind in BlockKind::ALL {
        let html = render_block(kind.as_str(), &json!({}), &json!({}));
        assert!(!html.trim().is_empty(), "{kind} rendered nothing");
        assert!(!html.contains("Unknown component type"), "{kind} fell back");
    }

    let unknown = render_block("CAROUSEL", &json!({"slides": []}), &json!(null));
    assert!(unknown.contains("Unknown component type"));
}
