use learning_log_core::db::open_db_in_memory;
use learning_log_core::{
    search_topics, FormRequest, JournalService, NewTopic, SearchCase, SearchForm, SearchOutcome,
    SqliteAccountRepository, SqliteTopicRepository, Topic, TopicRepository, TopicSearchQuery,
    UserRepository,
};
use rusqlite::Connection;

/// Seeds "Chess strategies" (owner A) and "Checkers" (owner B).
fn seed(conn: &Connection) -> (Topic, Topic) {
    let accounts = SqliteAccountRepository::new(conn);
    let owner_a = accounts.create_user("alice", "hash").unwrap();
    let owner_b = accounts.create_user("bruno", "hash").unwrap();
    let topics = SqliteTopicRepository::new(conn);
    let chess = topics
        .create_topic(&NewTopic {
            text: "Chess strategies".to_string(),
            owner: owner_a.id,
        })
        .unwrap();
    let checkers = topics
        .create_topic(&NewTopic {
            text: "Checkers".to_string(),
            owner: owner_b.id,
        })
        .unwrap();
    (chess, checkers)
}

fn texts(topics: &[Topic]) -> Vec<&str> {
    topics.iter().map(|topic| topic.text.as_str()).collect()
}

#[test]
fn sensitive_search_matches_exact_case_only() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let lower = search_topics(&conn, &TopicSearchQuery::new("chess")).unwrap();
    assert!(lower.is_empty());

    let capital = search_topics(&conn, &TopicSearchQuery::new("Chess")).unwrap();
    assert_eq!(texts(&capital), vec!["Chess strategies"]);
}

#[test]
fn insensitive_search_folds_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let query = TopicSearchQuery::new("chess").with_case(SearchCase::Insensitive);
    let hits = search_topics(&conn, &query).unwrap();
    assert_eq!(texts(&hits), vec!["Chess strategies"]);
}

#[test]
fn search_spans_all_owners_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let (chess, checkers) = seed(&conn);

    let hits = search_topics(&conn, &TopicSearchQuery::new("Che")).unwrap();
    let ids = hits.iter().map(|topic| topic.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![chess.id, checkers.id]);
    assert_ne!(hits[0].owner, hits[1].owner);
}

#[test]
fn wildcard_characters_match_literally() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    assert!(search_topics(&conn, &TopicSearchQuery::new("%"))
        .unwrap()
        .is_empty());
    assert!(search_topics(&conn, &TopicSearchQuery::new("C_ess"))
        .unwrap()
        .is_empty());
}

#[test]
fn service_search_without_query_rerenders_with_errors() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let service = JournalService::with_connection(&conn);

    match service.search(FormRequest::Display).unwrap() {
        SearchOutcome::Form(form) => assert!(!form.has_errors()),
        other => panic!("unexpected outcome: {other:?}"),
    }

    match service
        .search(FormRequest::Submit(SearchForm::new("  ")))
        .unwrap()
    {
        SearchOutcome::Form(form) => {
            assert_eq!(form.errors.for_field("query").count(), 1);
            assert_eq!(form.data.query, "  ");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn service_search_honours_configured_case_policy() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let sensitive = JournalService::with_connection(&conn);
    match sensitive
        .search(FormRequest::Submit(SearchForm::new("chess")))
        .unwrap()
    {
        SearchOutcome::Results { query, topics } => {
            assert_eq!(query, "chess");
            assert!(topics.is_empty());
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let insensitive =
        JournalService::with_connection(&conn).with_search_case(SearchCase::Insensitive);
    match insensitive
        .search(FormRequest::Submit(SearchForm::new("chess")))
        .unwrap()
    {
        SearchOutcome::Results { topics, .. } => {
            assert_eq!(texts(&topics), vec!["Chess strategies"]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}
