use std::sync::Arc;

use gamedex_catalog::*;
use gamedex_db::*;
use rusqlite::{Connection, params};

fn insert_game(
    conn: &Connection,
    id: &str,
    title: &str,
    developer: &str,
    platform: &str,
    tags: &str,
    zipped: bool,
) {
    conn.execute(
        "INSERT INTO game (id, title, developer, platform, tagsStr, activeDataOnDisk)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![id, title, developer, platform, tags, zipped],
    )
    .unwrap();
}

fn setup_db() -> Connection {
    let conn = open_memory().unwrap();
    insert_game(&conn, "g1", "Alpha Quest", "Acme", "Flash", "Action; Puzzle", true);
    insert_game(&conn, "g2", "Beta 100% Run", "Bolt", "HTML5", "Action; Extreme", false);
    insert_game(&conn, "g3", "Gamma_Ray", "Acme", "Flash", "Puzzle", false);
    insert_game(&conn, "g4", "Delta^Force", "Zed", "Shockwave", "Racing", true);
    insert_game(&conn, "g5", "Epsilon", "Acme Bolt Studios", "Flash", "Puzzle; Racing", false);
    conn.execute("UPDATE game SET series = 'Quest Saga' WHERE id = 'g1'", [])
        .unwrap();
    conn
}

fn service(ceiling: i64) -> SearchService {
    let registry = Arc::new(FieldRegistry::from_schema(default_schema()).unwrap());
    SearchService::new(registry, ceiling, vec!["Extreme".to_string()]).unwrap()
}

fn search(svc: &SearchService, conn: &Connection, pairs: &[(&str, &str)]) -> Vec<Entry> {
    svc.search(conn, &SearchRequest::from_pairs(pairs.iter().copied()))
        .unwrap()
}

fn text(entry: &Entry, name: &str) -> String {
    match entry.get(name) {
        Some(FieldValue::Text(s)) => s.clone(),
        other => panic!("expected text for {name}, got {other:?}"),
    }
}

fn ids(entries: &[Entry]) -> Vec<String> {
    entries.iter().map(|e| text(e, "id")).collect()
}

// ── Empty Requests ──────────────────────────────────────────────────────────

#[test]
fn no_filters_returns_nothing() {
    let conn = setup_db();
    let svc = service(-1);
    assert!(search(&svc, &conn, &[]).is_empty());
    assert!(search(&svc, &conn, &[("fields", "title"), ("limit", "3")]).is_empty());
    assert!(search(&svc, &conn, &[("unknownField", "x")]).is_empty());
}

// ── Escaping ────────────────────────────────────────────────────────────────

#[test]
fn percent_matches_literally() {
    let conn = setup_db();
    let svc = service(-1);
    assert_eq!(ids(&search(&svc, &conn, &[("title", "%")])), vec!["g2"]);
}

#[test]
fn underscore_matches_literally() {
    let conn = setup_db();
    let svc = service(-1);
    assert_eq!(ids(&search(&svc, &conn, &[("title", "_")])), vec!["g3"]);
}

#[test]
fn caret_matches_literally() {
    let conn = setup_db();
    let svc = service(-1);
    assert_eq!(ids(&search(&svc, &conn, &[("title", "^")])), vec!["g4"]);
}

#[test]
fn quotes_in_values_are_data() {
    let conn = setup_db();
    let svc = service(-1);
    let results = search(&svc, &conn, &[("title", "'; DROP TABLE game; --")]);
    assert!(results.is_empty());
    assert_eq!(ids(&search(&svc, &conn, &[("title", "alpha")])), vec!["g1"]);
}

// ── Combination Mode ────────────────────────────────────────────────────────

#[test]
fn sub_values_and_by_default() {
    let conn = setup_db();
    let svc = service(-1);
    assert_eq!(ids(&search(&svc, &conn, &[("developer", "acme,bolt")])), vec!["g5"]);
}

#[test]
fn sub_values_or_with_any() {
    let conn = setup_db();
    let svc = service(-1);
    let results = search(&svc, &conn, &[("developer", "acme,bolt"), ("any", "true")]);
    assert_eq!(ids(&results), vec!["g1", "g2", "g3", "g5"]);
}

#[test]
fn field_groups_combine_with_mode() {
    let conn = setup_db();
    let svc = service(-1);
    let both = search(&svc, &conn, &[("developer", "acme"), ("platform", "flash")]);
    assert_eq!(ids(&both), vec!["g1", "g3", "g5"]);

    let either = search(
        &svc,
        &conn,
        &[("developer", "zed"), ("platform", "html5"), ("any", "true")],
    );
    assert_eq!(ids(&either), vec!["g2", "g4"]);
}

// ── Smart Search ────────────────────────────────────────────────────────────

#[test]
fn smart_search_spans_descriptive_columns() {
    let conn = setup_db();
    let svc = service(-1);
    // Matches the developer column of three entries.
    assert_eq!(ids(&search(&svc, &conn, &[("smartSearch", "acme")])), vec!["g1", "g3", "g5"]);
    // Matches title or series.
    assert_eq!(ids(&search(&svc, &conn, &[("smartSearch", "saga")])), vec!["g1"]);
}

#[test]
fn smart_search_terms_follow_mode() {
    let conn = setup_db();
    let svc = service(-1);
    assert_eq!(ids(&search(&svc, &conn, &[("smartSearch", "alpha,acme")])), vec!["g1"]);
    let any = search(&svc, &conn, &[("smartSearch", "alpha,zed"), ("any", "true")]);
    assert_eq!(ids(&any), vec!["g1", "g4"]);
}

// ── Tag Filtering ───────────────────────────────────────────────────────────

#[test]
fn tags_str_requires_all_tags_by_default() {
    let conn = setup_db();
    let svc = service(-1);
    assert_eq!(ids(&search(&svc, &conn, &[("tagsStr", "action,PUZZLE")])), vec!["g1"]);
}

#[test]
fn tags_str_accepts_any_tag_with_any() {
    let conn = setup_db();
    let svc = service(-1);
    let results = search(&svc, &conn, &[("tagsStr", "action,puzzle"), ("any", "true")]);
    assert_eq!(ids(&results), vec!["g1", "g2", "g3", "g5"]);
}

#[test]
fn tags_str_matches_whole_tags_only() {
    let conn = setup_db();
    let svc = service(-1);
    assert!(search(&svc, &conn, &[("tagsStr", "act")]).is_empty());
}

#[test]
fn blocklist_applies_only_when_enabled() {
    let conn = setup_db();
    let svc = service(-1);
    assert_eq!(ids(&search(&svc, &conn, &[("platform", "html5")])), vec!["g2"]);
    assert!(search(&svc, &conn, &[("platform", "html5"), ("filter", "true")]).is_empty());

    let action = search(&svc, &conn, &[("tagsStr", "action"), ("filter", "TRUE")]);
    assert_eq!(ids(&action), vec!["g1"]);
}

#[test]
fn blocklist_is_case_sensitive() {
    let conn = setup_db();
    let registry = Arc::new(FieldRegistry::from_schema(default_schema()).unwrap());
    let svc = SearchService::new(registry, -1, vec!["extreme".to_string()]).unwrap();
    let results = search(&svc, &conn, &[("platform", "html5"), ("filter", "true")]);
    assert_eq!(ids(&results), vec!["g2"]);
}

// ── Projection ──────────────────────────────────────────────────────────────

#[test]
fn requested_fields_in_requested_order() {
    let conn = setup_db();
    let svc = service(-1);
    let results = search(&svc, &conn, &[("platform", "flash"), ("fields", "title,platform")]);
    assert_eq!(results.len(), 3);
    for entry in &results {
        assert_eq!(entry.keys().collect::<Vec<_>>(), vec!["title", "platform"]);
    }

    let reversed = search(&svc, &conn, &[("platform", "flash"), ("fields", "platform,title")]);
    assert_eq!(reversed[0].keys().collect::<Vec<_>>(), vec!["platform", "title"]);
}

#[test]
fn tags_never_leak_when_not_requested() {
    let conn = setup_db();
    let svc = service(-1);
    let results = search(
        &svc,
        &conn,
        &[("tagsStr", "racing"), ("fields", "id"), ("filter", "true")],
    );
    assert_eq!(ids(&results), vec!["g4", "g5"]);
    for entry in &results {
        assert_eq!(entry.len(), 1);
        assert!(entry.get("tags").is_none());
    }
    let json = serde_json::to_string(&results).unwrap();
    assert_eq!(json, r#"[{"id":"g4"},{"id":"g5"}]"#);
}

#[test]
fn unknown_fields_are_dropped() {
    let conn = setup_db();
    let svc = service(-1);
    let results = search(&svc, &conn, &[("id", "g1"), ("fields", "bogus,title")]);
    assert_eq!(results[0].keys().collect::<Vec<_>>(), vec!["title"]);

    let all = search(&svc, &conn, &[("id", "g1"), ("fields", "bogus")]);
    let registry = FieldRegistry::from_schema(default_schema()).unwrap();
    let expected: Vec<&str> = registry.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(all[0].keys().collect::<Vec<_>>(), expected);
}

#[test]
fn typed_values_render_as_json_types() {
    let conn = setup_db();
    let svc = service(-1);
    let results = search(&svc, &conn, &[("id", "g1"), ("fields", "title,tags,zipped")]);
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "title": "Alpha Quest", "tags": ["Action", "Puzzle"], "zipped": true }])
    );

    let results = search(&svc, &conn, &[("id", "g2"), ("fields", "zipped")]);
    assert_eq!(results[0].get("zipped"), Some(&FieldValue::Flag(false)));
}

#[test]
fn empty_tags_render_single_empty_string() {
    let conn = setup_db();
    insert_game(&conn, "g6", "Untagged", "Nobody", "Java", "", false);
    let svc = service(-1);
    let results = search(&svc, &conn, &[("id", "g6"), ("fields", "tags")]);
    assert_eq!(
        serde_json::to_string(&results).unwrap(),
        r#"[{"tags":[""]}]"#
    );
}

// ── Limits ──────────────────────────────────────────────────────────────────

#[test]
fn ceiling_bounds_requested_limit() {
    let conn = setup_db();
    let svc = service(3);
    assert_eq!(search(&svc, &conn, &[("library", "arcade"), ("limit", "5")]).len(), 3);
    assert_eq!(search(&svc, &conn, &[("library", "arcade"), ("limit", "2")]).len(), 2);
    assert_eq!(search(&svc, &conn, &[("library", "arcade"), ("limit", "x")]).len(), 3);
}

#[test]
fn unlimited_server_returns_everything() {
    let conn = setup_db();
    let svc = service(-1);
    assert_eq!(search(&svc, &conn, &[("library", "arcade")]).len(), 5);
    assert_eq!(search(&svc, &conn, &[("library", "arcade"), ("limit", "4")]).len(), 4);
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn bad_expression_is_query_error() {
    let conn = setup_db();
    let registry = FieldRegistry::from_schema(SearchSchema {
        table: "game".to_string(),
        id_column: "id".to_string(),
        join: None,
        fields: vec![
            FieldDescriptor::new("title", "game.no_such_column"),
            FieldDescriptor::new("tags", "game.tagsStr").with_type(FieldType::Array),
        ],
    })
    .unwrap();
    let svc = SearchService::new(Arc::new(registry), -1, vec![]).unwrap();
    let err = svc
        .search(&conn, &SearchRequest::from_pairs([("title", "a")]))
        .unwrap_err();
    assert!(matches!(err, SearchError::Sqlite(_)));
}

fn overflow_service(source: &str) -> SearchService {
    let registry = FieldRegistry::from_schema(SearchSchema {
        table: "game".to_string(),
        id_column: "id".to_string(),
        join: None,
        fields: vec![
            FieldDescriptor::new("id", "game.id"),
            FieldDescriptor::new("title", "game.title"),
            FieldDescriptor::new("platform", "game.platform"),
            FieldDescriptor::new("score", source),
            FieldDescriptor::new("tags", "game.tagsStr").with_type(FieldType::Array),
        ],
    })
    .unwrap();
    SearchService::new(Arc::new(registry), -1, vec![]).unwrap()
}

#[test]
fn runtime_failure_on_first_row_is_query_error() {
    let conn = setup_db();
    let svc = overflow_service("abs(-9223372036854775807 - 1)");
    let err = svc
        .search(&conn, &SearchRequest::from_pairs([("title", "alpha")]))
        .unwrap_err();
    assert!(matches!(err, SearchError::Sqlite(_)));
}

#[test]
fn runtime_failure_after_first_row_keeps_earlier_rows() {
    let conn = setup_db();
    insert_game(&conn, "p1", "First", "Dev", "Partial", "", false);
    insert_game(&conn, "p2", "Second", "Dev", "Partial", "", false);
    let svc = overflow_service(
        "CASE WHEN game.id = 'p2' THEN abs(-9223372036854775807 - 1) ELSE 'ok' END",
    );
    let results = search(&svc, &conn, &[("platform", "partial"), ("fields", "id,score")]);
    assert_eq!(ids(&results), vec!["p1"]);
    assert_eq!(text(&results[0], "score"), "ok");
}

#[test]
fn decode_failure_keeps_earlier_rows() {
    let conn = setup_db();
    insert_game(&conn, "p1", "First", "Dev", "Partial", "", false);
    conn.execute(
        "INSERT INTO game (id, title, platform) VALUES ('p2', X'00FF', 'Partial')",
        [],
    )
    .unwrap();
    insert_game(&conn, "p3", "Third", "Dev", "Partial", "", false);

    let svc = service(-1);
    let results = search(&svc, &conn, &[("platform", "partial"), ("fields", "id,title")]);
    assert_eq!(ids(&results), vec!["p1"]);
}

#[test]
fn registry_without_tags_is_rejected() {
    let registry = FieldRegistry::from_schema(SearchSchema {
        table: "game".to_string(),
        id_column: "id".to_string(),
        join: None,
        fields: vec![FieldDescriptor::new("title", "title")],
    })
    .unwrap();
    let err = SearchService::new(Arc::new(registry), -1, vec![]).unwrap_err();
    assert!(matches!(err, CompileError::MissingTagsField));
}

// ── Join Elision ────────────────────────────────────────────────────────────

fn join_schema() -> SearchSchema {
    SearchSchema {
        table: "game".to_string(),
        id_column: "id".to_string(),
        join: Some(JoinSpec {
            table: "game_override".to_string(),
            key: "gameId".to_string(),
        }),
        fields: vec![
            FieldDescriptor::new("id", "game.id"),
            FieldDescriptor::new("title", "game.title"),
            FieldDescriptor::new("platform", "game.platform"),
            FieldDescriptor::new("displayTitle", "COALESCE(game_override.title, game.title)")
                .joined(),
            FieldDescriptor::new("note", "game_override.note").joined(),
            FieldDescriptor::new("tags", "game.tagsStr").with_type(FieldType::Array),
        ],
    }
}

fn setup_join_db() -> Connection {
    let conn = setup_db();
    conn.execute_batch(
        "CREATE TABLE game_override (gameId TEXT PRIMARY KEY, title TEXT, note TEXT);
         INSERT INTO game_override (gameId, title, note)
         VALUES ('g1', 'Alpha Remastered', 'fan favourite');",
    )
    .unwrap();
    conn
}

#[test]
fn join_elision_does_not_change_results() {
    let conn = setup_join_db();
    let registry = Arc::new(FieldRegistry::from_schema(join_schema()).unwrap());
    let request = SearchRequest::from_pairs([("platform", "flash"), ("fields", "id,title")]);

    let plain = SearchCompiler::new(registry.clone(), -1).unwrap();
    let forced = plain.clone().force_join(true);
    assert!(!plain.compile(&request).unwrap().joined);
    assert!(forced.compile(&request).unwrap().joined);

    let elided = SearchService::from_compiler(plain, vec![])
        .search(&conn, &request)
        .unwrap();
    let joined = SearchService::from_compiler(forced, vec![])
        .search(&conn, &request)
        .unwrap();
    assert_eq!(ids(&elided), vec!["g1", "g3", "g5"]);
    assert_eq!(elided, joined);
}

#[test]
fn joined_fields_keep_row_cardinality() {
    let conn = setup_join_db();
    let registry = Arc::new(FieldRegistry::from_schema(join_schema()).unwrap());
    let svc = SearchService::new(registry, -1, vec![]).unwrap();
    let results = search(
        &svc,
        &conn,
        &[("platform", "flash"), ("fields", "id,displayTitle,note")],
    );
    assert_eq!(ids(&results), vec!["g1", "g3", "g5"]);
    assert_eq!(text(&results[0], "displayTitle"), "Alpha Remastered");
    assert_eq!(text(&results[0], "note"), "fan favourite");
    assert_eq!(text(&results[1], "displayTitle"), "Gamma_Ray");
    assert_eq!(text(&results[1], "note"), "");
}

#[test]
fn filtering_on_joined_field() {
    let conn = setup_join_db();
    let registry = Arc::new(FieldRegistry::from_schema(join_schema()).unwrap());
    let svc = SearchService::new(registry, -1, vec![]).unwrap();
    let results = search(&svc, &conn, &[("displayTitle", "remaster"), ("fields", "id")]);
    assert_eq!(ids(&results), vec!["g1"]);
}
