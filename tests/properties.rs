//! Property-based invariant tests for column parsing, sizes synthesis and
//! markup assembly.
//!
//! 1. Class strings without grid tokens resolve to full width everywhere.
//! 2. A base span carries to every breakpoint.
//! 3. A breakpoint span leaves the smaller breakpoints at full width.
//! 4. A sizes value has one clause per breakpoint plus the pivot clause,
//!    ascending, with no trailing separator.
//! 5. Alternate formats double the sources, alternates first.
//! 6. The deferred-load rewrite leaves no eager names and ignores lookalikes.
//! 7. Reverting a deferred tree reproduces the eager markup.
//! 8. Unresolvable images never produce markup.

use picture_synth::breakpoints::BreakpointTable;
use picture_synth::columns::{GRID_COLUMNS, resolve_column_spans};
use picture_synth::markup::{DEFERRED_ATTRIBUTES, Element, defer_loading, restore_eager};
use picture_synth::repository::ManifestRepository;
use picture_synth::sizes::{SizesOptions, build_sizes};
use picture_synth::{PictureRequest, Synthesizer};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const MANIFEST: &str = r#"{
  "images": {
    "1": {
      "alt": "Pier",
      "sizes": {
        "thumbnail": { "url": "/m/pier-150.jpg", "width": 150, "height": 100 },
        "medium": { "url": "/m/pier-300.jpg", "width": 300, "height": 200 },
        "large": { "url": "/m/pier-1024.jpg", "width": 1024, "height": 683 },
        "full": { "url": "/m/pier.jpg", "width": 2048, "height": 1365 }
      }
    }
  }
}"#;

fn repo() -> ManifestRepository {
    ManifestRepository::from_json(MANIFEST).unwrap()
}

fn table_strategy() -> impl Strategy<Value = BreakpointTable> {
    prop_oneof![
        Just(BreakpointTable::bootstrap4()),
        Just(BreakpointTable::bootstrap5()),
    ]
}

/// Class tokens without the substring "col".
fn plain_class_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(-[a-z0-9]{1,3})?".prop_filter("grid token", |t| !t.contains("col"))
}

/// Mix of grid tokens, broken grid tokens and unrelated classes.
fn class_string_strategy() -> impl Strategy<Value = String> {
    let token = prop_oneof![
        (1u32..=12).prop_map(|n| format!("col-{n}")),
        (
            prop::sample::select(vec!["xs", "sm", "md", "lg", "xl", "xxl"]),
            0u32..=16
        )
            .prop_map(|(bp, n)| format!("col-{bp}-{n}")),
        Just("col".to_string()),
        Just("col-md".to_string()),
        Just("col-huge-4".to_string()),
        plain_class_strategy(),
    ];
    prop::collection::vec(token, 0..6).prop_map(|tokens| tokens.join(" "))
}

fn explicit_source_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    let pair = (
        prop::sample::select(vec!["xxs", "xs", "sm", "md", "lg", "xl"]),
        prop::sample::select(vec!["thumbnail", "medium", "large", "full"]),
    )
        .prop_map(|(bp, variant)| (bp.to_string(), variant.to_string()));
    prop::collection::vec(pair, 1..6)
}

fn min_width_of(clause: &str) -> Option<f64> {
    let rest = clause.strip_prefix("(min-width: ")?;
    let (value, _) = rest.split_once("px")?;
    value.parse().ok()
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Column spans
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn no_grid_tokens_means_full_width(
        table in table_strategy(),
        classes in prop::collection::vec(plain_class_strategy(), 0..6),
    ) {
        let spans = resolve_column_spans(&classes.join(" "), &table);
        prop_assert!(spans.spans().iter().all(|&s| s == GRID_COLUMNS));
        prop_assert_eq!(spans.spans().len(), table.grid().len());
    }

    #[test]
    fn base_span_carries_everywhere(table in table_strategy(), n in 1u32..=12) {
        let spans = resolve_column_spans(&format!("img-fluid col-{n}"), &table);
        prop_assert!(spans.spans().iter().all(|&s| s == n));
    }

    #[test]
    fn breakpoint_span_leaves_smaller_at_full_width(
        index in 1usize..6,
        n in 1u32..=12,
    ) {
        let table = BreakpointTable::bootstrap5();
        let name = &table.grid()[index].name;
        let spans = resolve_column_spans(&format!("col-{name}-{n}"), &table).spans();
        prop_assert!(spans[..index].iter().all(|&s| s == GRID_COLUMNS));
        prop_assert!(spans[index..].iter().all(|&s| s == n));
    }

    #[test]
    fn spans_always_within_grid(table in table_strategy(), classes in class_string_strategy()) {
        let spans = resolve_column_spans(&classes, &table);
        prop_assert!(spans.spans().iter().all(|&s| (1..=GRID_COLUMNS).contains(&s)));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Sizes shape
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sizes_clauses_ascend_without_trailing_separator(
        table in table_strategy(),
        classes in class_string_strategy(),
        gutter in 0u32..=40,
    ) {
        let options = SizesOptions { gutter, pivot_width: 450 };
        let spans = resolve_column_spans(&classes, &table);
        let sizes = build_sizes(&spans, &table, &options);

        prop_assert!(!sizes.ends_with(", "));
        prop_assert!(!sizes.ends_with(','));
        let clauses: Vec<&str> = sizes.split(", ").collect();
        prop_assert_eq!(clauses.len(), table.grid().len() + 1);
        prop_assert!(clauses[0].starts_with("(max-width: 450px) calc(100vw - "));

        let mins: Vec<f64> = clauses[1..].iter().filter_map(|c| min_width_of(c)).collect();
        prop_assert_eq!(mins.len(), clauses.len() - 1);
        prop_assert!(mins.windows(2).all(|w| w[0] < w[1]), "not ascending: {}", sizes);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Alternate formats
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn alternates_double_and_precede_fallbacks(sources in explicit_source_strategy()) {
        let count = sources.len();
        let request = PictureRequest::builder("1", "full").sources(sources).webp().build();
        let tree = Synthesizer::default().synthesize(&request, &repo()).unwrap();
        let elements = tree.sources();

        prop_assert_eq!(elements.len(), 2 * count);
        for i in 0..count {
            let alternate = elements[i];
            let fallback = elements[i + count];
            prop_assert_eq!(alternate.get_attr("type"), Some("image/webp"));
            prop_assert_eq!(fallback.get_attr("type"), None);
            prop_assert_eq!(alternate.get_attr("media"), fallback.get_attr("media"));
            let expected = fallback.get_attr("srcset").map(|s| format!("{s}.webp"));
            prop_assert_eq!(alternate.get_attr("srcset").map(str::to_string), expected);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Deferred-load rewrite
// ═════════════════════════════════════════════════════════════════════════

const LOOKALIKES: [&str; 6] = ["data-source", "srcset-hint", "resizes", "alt", "class", "data-id"];

fn attr_name_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "src", "srcset", "sizes", "data-source", "srcset-hint", "resizes", "alt", "class", "data-id",
    ])
}

fn element_strategy() -> impl Strategy<Value = Element> {
    let leaf = (
        prop::sample::select(vec!["img", "source"]),
        prop::collection::vec((attr_name_strategy(), "[a-z/.]{0,10}"), 0..5),
    )
        .prop_map(|(tag, attrs)| {
            attrs
                .into_iter()
                .fold(Element::new(tag), |el, (name, value)| el.attr(name, value))
        });
    prop::collection::vec(leaf, 0..5).prop_map(|children| Element::new("picture").children(children))
}

fn names(el: &Element) -> Vec<String> {
    let mut out: Vec<String> = el.attrs.iter().map(|a| a.name.clone()).collect();
    for child in &el.children {
        out.extend(names(child));
    }
    out
}

proptest! {
    #[test]
    fn rewrite_leaves_no_eager_names(original in element_strategy()) {
        let mut el = original.clone();
        defer_loading(&mut el);

        let after = names(&el);
        for (eager, _) in DEFERRED_ATTRIBUTES {
            prop_assert!(!after.iter().any(|n| n == eager));
        }
        for lookalike in LOOKALIKES {
            let count = |list: &[String]| list.iter().filter(|n| *n == lookalike).count();
            prop_assert_eq!(count(&after), count(&names(&original)));
        }

        restore_eager(&mut el);
        prop_assert_eq!(el, original);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7-8. Whole-tree properties
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn deferred_tree_reverts_to_eager(
        classes in class_string_strategy(),
        img_classes in prop::collection::vec(plain_class_strategy(), 0..3),
        size in prop::sample::select(vec!["thumbnail", "medium", "large", "full"]),
        webp in any::<bool>(),
        noscript in any::<bool>(),
    ) {
        let mut base = PictureRequest::builder("1", size).auto_sizes(&classes);
        for class in img_classes.iter().filter(|c| c.as_str() != "lazy") {
            base = base.class(class);
        }
        if webp {
            base = base.webp();
        }
        let synth = Synthesizer::default();
        let eager = synth.render(&base.clone().build(), &repo()).unwrap();
        let lazy = synth
            .synthesize(&base.lazy_load("lazy").noscript_fallback(noscript).build(), &repo())
            .unwrap();
        prop_assert_eq!(lazy.noscript().is_some(), noscript);
        prop_assert_eq!(lazy.into_eager("lazy").into_string(), eager);
    }

    #[test]
    fn unresolvable_image_never_renders(
        image in "[0-9]{2,6}",
        classes in class_string_strategy(),
        sources in explicit_source_strategy(),
        explicit in any::<bool>(),
    ) {
        let mut builder = PictureRequest::builder(image.as_str(), "full")
            .auto_sizes(&classes)
            .webp()
            .lazy_load("lazy");
        if explicit {
            builder = builder.sources(sources);
        }
        prop_assert_eq!(Synthesizer::default().render(&builder.build(), &repo()), None);
    }
}
