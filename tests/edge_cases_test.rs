/// Edge case integration tests
///
/// These tests cover filesystem quirks, unusual log contents and roster problems
mod common;

use std::fs;

use chrono::NaiveDate;
use common::{BlistBuilder, LogFileBuilder, PurpleDirBuilder, at};
use purple_log_explorer::indexer::{build_contact_list, compute_stats, render_day, summarize};
use purple_log_explorer::models::{Account, LogKind};
use purple_log_explorer::search::{CancelFlag, Search, SearchTask};
use purple_log_explorer::source::{LogSource, PurpleLogDir};

fn search_aliases(store: &PurpleLogDir, term: &str) -> Vec<String> {
    let roster = store.load_roster().unwrap();
    let task = SearchTask::new(term, CancelFlag::new());
    Search::new(task, store, &roster)
        .map(|hit| {
            let alias = hit.alias.clone();
            store.release(hit.log);
            alias
        })
        .collect()
}

#[test]
fn test_edge_case_empty_purple_dir() {
    let temp = PurpleDirBuilder::new().build();
    let store = PurpleLogDir::open(temp.path()).unwrap();
    let roster = store.load_roster().unwrap();

    assert!(roster.is_empty());
    assert!(build_contact_list(&store, &roster).is_empty());
    let stats = compute_stats(&store, &roster);
    assert_eq!(stats.logs, 0);
    assert!(stats.first_day.is_none());
}

#[test]
fn test_edge_case_unicode_names_and_text() {
    let temp = PurpleDirBuilder::new()
        .with_blist(&BlistBuilder::new().contact("Zoë", &[("prpl-jabber", "me@example.org", "zoë@例え.jp")]))
        .with_html_log(
            &LogFileBuilder::new("prpl-jabber", "me@example.org", "zoë@例え.jp")
                .body("<b>zoë:</b> 测试 中文 テスト 👋<br/>"),
        )
        .build();
    let store = PurpleLogDir::open(temp.path()).unwrap();

    assert_eq!(search_aliases(&store, "テスト"), vec!["Zoë".to_string()]);
    assert_eq!(search_aliases(&store, "ZOË"), vec!["Zoë".to_string()]);
}

#[test]
fn test_edge_case_crlf_text_log() {
    let temp = PurpleDirBuilder::new()
        .with_text_log(
            &LogFileBuilder::new("prpl-irc", "me", "dave")
                .body("(10:00:00) dave: first line\r\n(10:00:05) dave: second line\r"),
        )
        .build();
    let store = PurpleLogDir::open(temp.path()).unwrap();
    let roster = store.load_roster().unwrap();
    let dave = build_contact_list(&store, &roster)[0].id;

    let transcript = render_day(&store, &roster, dave, NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
    let text = transcript.to_plain_text();
    assert!(text.contains("dave: first line"));
    assert!(text.contains("dave: second line"));
    assert_eq!(search_aliases(&store, "second line").len(), 1);
}

#[test]
fn test_edge_case_non_log_files_ignored() {
    let temp = PurpleDirBuilder::new()
        .with_html_log(&LogFileBuilder::new("prpl-jabber", "me@example.org", "erin@example.org"))
        .build();
    let store = PurpleLogDir::open(temp.path()).unwrap();
    let account = Account::new("prpl-jabber", "me@example.org");
    let dir = store.buddy_dir(LogKind::Im, "erin@example.org", &account);
    fs::write(dir.join(".DS_Store"), "junk").unwrap();
    fs::write(dir.join("2023-05-02.100000.html.bak"), "junk").unwrap();
    fs::create_dir(dir.join("2023-05-03.100000.html")).unwrap();

    assert_eq!(store.logs(LogKind::Im, "erin@example.org", &account).len(), 1);
}

#[test]
fn test_edge_case_invalid_utf8_is_read_lossily() {
    let temp = PurpleDirBuilder::new().build();
    let store = PurpleLogDir::open(temp.path()).unwrap();
    let account = Account::new("prpl-jabber", "me@example.org");
    let dir = store.buddy_dir(LogKind::Im, "frank@example.org", &account);
    fs::create_dir_all(&dir).unwrap();
    let mut bytes = b"header\nbefore \xff\xfe after".to_vec();
    bytes.push(b'\n');
    fs::write(dir.join("2023-05-01.120000.txt"), bytes).unwrap();

    assert_eq!(search_aliases(&store, "after"), vec!["frank@example.org".to_string()]);
}

#[test]
fn test_edge_case_header_only_log() {
    let temp = PurpleDirBuilder::new().build();
    let store = PurpleLogDir::open(temp.path()).unwrap();
    let account = Account::new("prpl-jabber", "me@example.org");
    let dir = store.buddy_dir(LogKind::Im, "gina@example.org", &account);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("2023-05-01.120000.html"), "<h3>Conversation with gina</h3>\n").unwrap();
    fs::write(dir.join("2023-05-02.120000.html"), "<h3>Conversation with gina</h3>").unwrap();

    // Only the header exists, so there is nothing to find
    assert!(search_aliases(&store, "conversation").is_empty());
}

#[test]
fn test_edge_case_malformed_blist_is_an_error() {
    let temp = PurpleDirBuilder::new()
        .with_file("blist.xml", "<purple><blist><contact alias='x'><buddy></contact></purple>")
        .build();
    let store = PurpleLogDir::open(temp.path()).unwrap();
    assert!(store.load_roster().is_err());
}

#[test]
fn test_edge_case_leap_day() {
    let temp = PurpleDirBuilder::new()
        .with_html_log(
            &LogFileBuilder::new("prpl-jabber", "me@example.org", "hank@example.org")
                .started(at(2024, 2, 29, 23, 59))
                .body("leap"),
        )
        .build();
    let store = PurpleLogDir::open(temp.path()).unwrap();
    let roster = store.load_roster().unwrap();
    let hank = build_contact_list(&store, &roster)[0].id;

    let summary = summarize(&store, &roster, hank, 2024, 2);
    assert_eq!(summary.latest_day, Some(29));
    let transcript = render_day(&store, &roster, hank, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(transcript.entries.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_edge_case_symlinked_log_skipped() {
    let temp = PurpleDirBuilder::new()
        .with_html_log(&LogFileBuilder::new("prpl-jabber", "me@example.org", "ivan@example.org"))
        .build();
    let store = PurpleLogDir::open(temp.path()).unwrap();
    let account = Account::new("prpl-jabber", "me@example.org");
    let dir = store.buddy_dir(LogKind::Im, "ivan@example.org", &account);

    let outside = temp.path().join("secret.html");
    fs::write(&outside, "header\nsecret").unwrap();
    std::os::unix::fs::symlink(&outside, dir.join("2023-06-01.100000.html")).unwrap();

    assert_eq!(store.logs(LogKind::Im, "ivan@example.org", &account).len(), 1);
    assert!(search_aliases(&store, "secret").is_empty());
}
