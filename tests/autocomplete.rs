mod helpers;

use helpers::{FakeSource, TestContext};

use querybar::autocomplete::GroupKind;
use querybar::config::Config;
use querybar::query::tokenize;

fn no_debounce() -> Config {
    Config {
        debounce_ms: 0,
        ..Default::default()
    }
}

/// Partial free text is matched against tag keys, recent searches follow
#[tokio::test]
async fn test_free_text_suggests_tag_keys() {
    let source = FakeSource::default().with_recent(&["is:ignored"]);
    let mut ctx = TestContext::with_config(source, no_debounce());

    ctx.set_query("is:unresolved brows").await;

    assert_eq!(ctx.kinds(), vec![GroupKind::TagKey, GroupKind::RecentSearch]);
    assert_eq!(ctx.values(GroupKind::TagKey), vec!["browser:"]);
    assert_eq!(ctx.values(GroupKind::RecentSearch), vec!["is:ignored"]);
}

/// A quoted value with a space stays one term and the next term is completed
#[tokio::test]
async fn test_quoted_value_is_single_term() {
    let query = r#"browser:"Chrome 33.0" ass"#;
    let tokenized = tokenize(query, query.len());
    assert_eq!(tokenized.terms.len(), 2);
    assert_eq!(tokenized.terms[0].text, r#"browser:"Chrome 33.0""#);

    let mut ctx = TestContext::with_config(FakeSource::default(), no_debounce());
    ctx.set_query(query).await;
    assert_eq!(ctx.values(GroupKind::TagKey), vec!["assigned:"]);
}

/// An empty value still looks up every known value
#[tokio::test]
async fn test_empty_value_fetches_all_values() {
    let source = FakeSource::default().with_values("user", &["alice", "bob"]);
    let mut ctx = TestContext::with_config(source, no_debounce());

    ctx.set_query("user:").await;

    assert_eq!(
        ctx.source.value_calls(),
        vec![("user".to_string(), String::new())]
    );
    assert_eq!(ctx.kinds(), vec![GroupKind::TagOperator, GroupKind::TagValue]);
    assert_eq!(ctx.values(GroupKind::TagValue), vec!["alice", "bob"]);
}

/// Accepting a value containing whitespace quotes it
#[tokio::test]
async fn test_value_with_space_is_quoted() {
    let source = FakeSource::default().with_values("release", &["1.2.3 (build 9)"]);
    let mut ctx = TestContext::with_config(source, no_debounce());

    ctx.set_query("release:1.").await;
    assert_eq!(
        ctx.values(GroupKind::TagValue),
        vec!["latest", "1.2.3 (build 9)"]
    );

    ctx.pick_value("1.2.3 (build 9)").await;
    assert_eq!(ctx.query(), r#"release:"1.2.3 (build 9)" "#);
    assert_eq!(ctx.session.buffer().cursor_byte_pos(), ctx.query().len());
}

/// A recent search replaces the whole query and runs it
#[tokio::test]
async fn test_recent_search_replaces_query() {
    let source = FakeSource::default().with_recent(&["is:ignored assigned:me"]);
    let mut ctx = TestContext::with_config(source, no_debounce());

    ctx.set_query("foo bar").await;
    assert_eq!(ctx.kinds(), vec![GroupKind::RecentSearch]);

    ctx.pick_value("is:ignored assigned:me").await;

    assert_eq!(ctx.query(), "is:ignored assigned:me");
    assert_eq!(ctx.searched(), vec!["is:ignored assigned:me"]);
    assert_eq!(
        *ctx.source.saved.lock().unwrap(),
        vec!["is:ignored assigned:me".to_string()]
    );
}

/// Ordered tags offer relational operators with the tag name in the description
#[tokio::test]
async fn test_operator_helpers_for_numeric_tag() {
    let mut ctx = TestContext::with_config(FakeSource::default(), no_debounce());

    ctx.set_query("timesSeen:").await;

    let operators = ctx.group(GroupKind::TagOperator).unwrap();
    assert_eq!(operators.title, "Operator Helpers");
    assert_eq!(operators.items.len(), 7);
    assert!(
        operators
            .items
            .iter()
            .all(|item| item.description.contains("timesSeen"))
    );

    ctx.pick_value(":>=").await;
    assert_eq!(ctx.query(), "timesSeen:>=");
}

#[tokio::test]
async fn test_unknown_tag_reports_invalid() {
    let mut ctx = TestContext::with_config(FakeSource::default(), no_debounce());

    ctx.set_query("nosuchtag:value").await;

    assert_eq!(ctx.kinds(), vec![GroupKind::InvalidTag]);
    assert_eq!(ctx.groups()[0].tag_name, "nosuchtag");
    assert_eq!(ctx.source.value_call_count(), 0);
}

/// Backend failures show no suggestions instead of an error
#[tokio::test]
async fn test_fetch_error_yields_empty_groups() {
    let source = FakeSource::default()
        .with_values("browser", &["Chrome"])
        .with_recent(&["is:ignored"])
        .failing();
    let mut ctx = TestContext::with_config(source, no_debounce());

    ctx.set_query("browser:ch").await;

    assert!(ctx.groups().is_empty());
    assert_eq!(ctx.source.value_call_count(), 1);
}

#[tokio::test]
async fn test_member_values_follow_watch_list() {
    let mut ctx = TestContext::with_config(FakeSource::default(), no_debounce());

    ctx.set_query("assigned:").await;
    assert_eq!(
        ctx.values(GroupKind::TagValue),
        vec!["me", "none", "my_teams"]
    );

    ctx.members
        .send_replace(vec!["jane@example.com".to_string(), "joe@example.com".to_string()]);
    ctx.set_query("assigned:ja").await;
    assert_eq!(ctx.values(GroupKind::TagValue), vec!["jane@example.com"]);
}

/// Free release lookups list the fixed values before live releases
#[tokio::test]
async fn test_first_release_combines_predefined_and_live() {
    let source = FakeSource::default().with_releases(&["2.0.0", "1.9.0"]);
    let mut ctx = TestContext::with_config(source, no_debounce());

    ctx.set_query("firstRelease:").await;

    assert_eq!(
        ctx.values(GroupKind::TagValue),
        vec!["latest", "2.0.0", "1.9.0"]
    );
    assert_eq!(
        ctx.source
            .release_calls
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn test_max_items_truncates_groups() {
    let config = Config {
        max_search_items: 2,
        ..no_debounce()
    };
    let mut ctx = TestContext::with_config(FakeSource::default(), config);

    ctx.set_query("is:").await;
    assert_eq!(ctx.values(GroupKind::TagValue), vec!["resolved", "unresolved"]);
}

/// Suggestions that would push the query past its maximum length are hidden
#[tokio::test]
async fn test_max_query_length_drops_long_items() {
    let config = Config {
        max_query_length: Some(12),
        max_search_items: 0,
        ..no_debounce()
    };
    let mut ctx = TestContext::with_config(FakeSource::default(), config);

    ctx.set_query("is:").await;

    let values = ctx.values(GroupKind::TagValue);
    assert!(values.contains(&"resolved".to_string()));
    assert!(!values.contains(&"unresolved".to_string()));
    assert!(values.iter().all(|v| v.chars().count() <= 9));
}

/// Completing a value in the middle of the query leaves the other terms alone
#[tokio::test]
async fn test_completing_middle_term() {
    let source = FakeSource::default().with_values("browser", &["chrome", "firefox"]);
    let mut ctx = TestContext::with_config(source, no_debounce());

    ctx.set_query("is:unresolved browser:chr os:linux").await;
    ctx.session.set_cursor(25).await;
    assert_eq!(ctx.values(GroupKind::TagValue), vec!["chrome"]);

    ctx.pick_value("chrome").await;
    assert_eq!(ctx.query(), "is:unresolved browser:chrome os:linux");
    assert_eq!(ctx.session.buffer().cursor_byte_pos(), 29);
}

#[tokio::test]
async fn test_hidden_environment() {
    let config = Config {
        exclude_environment: true,
        ..no_debounce()
    };
    let source = FakeSource::default().with_values("environment", &["prod"]);
    let mut ctx = TestContext::with_config(source, config);

    ctx.set_query("env").await;
    assert!(ctx.values(GroupKind::TagKey).is_empty());

    ctx.set_query("environment:pr").await;
    assert!(ctx.group(GroupKind::TagValue).is_none());
    assert_eq!(ctx.source.value_call_count(), 0);
}
