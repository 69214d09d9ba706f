//! Tests for the scrape driver and per-channel scraper

use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use telegram_scraper::commands::scrape;
use telegram_scraper::{scrape_channel, ChannelOutcome, ChannelRef, RecordWriter, ScraperConfig};

use crate::common::{FakeMessage, FakeSource};

fn config_in(temp: &TempDir, channels: &[&str]) -> ScraperConfig {
    ScraperConfig {
        channels: channels.iter().map(|c| c.to_string()).collect(),
        output_csv: temp.path().join("data/raw/telegram_data.csv"),
        media_dir: temp.path().join("data/raw/telegram_photos"),
        delay: Duration::ZERO,
        limit: None,
    }
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    reader
        .records()
        .map(|r| r.expect("row").iter().map(str::to_string).collect())
        .collect()
}

fn media_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("media dir")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn end_to_end_one_good_one_missing_channel() {
    let temp = tempfile::tempdir().unwrap();
    let source = FakeSource::new().with_channel(
        "A",
        "Channel A",
        vec![
            FakeMessage::photo(2, Some("new arrivals")),
            FakeMessage::plain(1, "hello"),
        ],
    );
    let config = config_in(&temp, &["@A", "@B"]);

    let summary = scrape::run(&source, &config).await.unwrap();

    let content = fs::read_to_string(&config.output_csv).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.starts_with("Channel Title,Channel Username,ID,Message,Date,Media Path\n"));

    assert_eq!(media_files(&config.media_dir), vec!["A_2.jpg"]);

    let skipped = summary.skipped();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].0, "@B");
    assert!(skipped[0].1.contains("@B"));
    assert_eq!(summary.total_messages(), 2);
    assert_eq!(summary.total_photos(), 1);
}

#[tokio::test]
async fn media_path_column_matches_file_naming() {
    let temp = tempfile::tempdir().unwrap();
    let source = FakeSource::new().with_channel(
        "ZemenExpress",
        "Zemen Express",
        vec![FakeMessage::photo(42, None), FakeMessage::plain(41, "price list")],
    );
    let config = config_in(&temp, &["@ZemenExpress"]);

    scrape::run(&source, &config).await.unwrap();

    let rows = read_rows(&config.output_csv);
    assert_eq!(rows.len(), 2);

    let expected = config.media_dir.join("ZemenExpress_42.jpg");
    assert_eq!(rows[0][0], "Zemen Express");
    assert_eq!(rows[0][1], "@ZemenExpress");
    assert_eq!(rows[0][2], "42");
    assert_eq!(rows[0][3], "");
    assert_eq!(rows[0][5], expected.to_string_lossy());
    assert!(expected.exists());

    assert_eq!(rows[1][3], "price list");
    assert_eq!(rows[1][5], "");
}

#[tokio::test]
async fn rows_follow_channel_then_message_order() {
    let temp = tempfile::tempdir().unwrap();
    let source = FakeSource::new()
        .with_channel(
            "first_shop",
            "First",
            vec![FakeMessage::plain(3, "c"), FakeMessage::plain(2, "b"), FakeMessage::plain(1, "a")],
        )
        .with_channel(
            "second_shop",
            "Second",
            vec![FakeMessage::plain(9, "z"), FakeMessage::plain(8, "y")],
        );
    let config = config_in(&temp, &["@second_shop", "@first_shop"]);

    scrape::run(&source, &config).await.unwrap();

    let order: Vec<(String, String)> = read_rows(&config.output_csv)
        .into_iter()
        .map(|r| (r[1].clone(), r[2].clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("@second_shop".to_string(), "9".to_string()),
            ("@second_shop".to_string(), "8".to_string()),
            ("@first_shop".to_string(), "3".to_string()),
            ("@first_shop".to_string(), "2".to_string()),
            ("@first_shop".to_string(), "1".to_string()),
        ]
    );
    assert_eq!(source.resolved(), vec!["second_shop", "first_shop"]);
}

#[tokio::test]
async fn iteration_error_keeps_written_rows_and_continues() {
    let temp = tempfile::tempdir().unwrap();
    let source = FakeSource::new()
        .with_broken_channel(
            "flaky_channel",
            "Flaky",
            vec![
                FakeMessage::plain(5, "one"),
                FakeMessage::plain(4, "two"),
                FakeMessage::plain(3, "three"),
            ],
            2,
        )
        .with_channel("steady_channel", "Steady", vec![FakeMessage::plain(1, "ok")]);
    let config = config_in(&temp, &["@flaky_channel", "@steady_channel"]);

    let summary = scrape::run(&source, &config).await.unwrap();

    assert_eq!(
        summary.channels[0].outcome,
        ChannelOutcome::Skipped {
            reason: "Telegram API error: FLOOD_WAIT_30".to_string(),
            messages: 2,
            photos: 0,
        }
    );
    assert!(!summary.channels[1].outcome.is_skipped());

    let rows = read_rows(&config.output_csv);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2][1], "@steady_channel");
}

#[tokio::test]
async fn photos_before_iteration_error_are_counted() {
    let temp = tempfile::tempdir().unwrap();
    let source = FakeSource::new().with_broken_channel(
        "flaky_photos",
        "Flaky Photos",
        vec![
            FakeMessage::photo(3, Some("red dress")),
            FakeMessage::photo(2, None),
            FakeMessage::plain(1, "never reached"),
        ],
        2,
    );
    let config = config_in(&temp, &["@flaky_photos"]);

    let summary = scrape::run(&source, &config).await.unwrap();

    assert_eq!(
        media_files(&config.media_dir),
        vec!["flaky_photos_2.jpg", "flaky_photos_3.jpg"]
    );
    assert_eq!(summary.total_photos(), 2);
    assert_eq!(summary.channels[0].outcome.photos(), 2);
    assert_eq!(summary.channels[0].outcome.messages(), 2);
    assert!(summary.channels[0].outcome.is_skipped());
}

#[tokio::test]
async fn download_failure_abandons_channel_before_row_is_written() {
    let temp = tempfile::tempdir().unwrap();
    let source = FakeSource::new()
        .with_channel(
            "photo_shop",
            "Photo Shop",
            vec![
                FakeMessage::plain(3, "text first"),
                FakeMessage::photo(2, Some("broken photo")),
                FakeMessage::plain(1, "never reached"),
            ],
        )
        .with_failing_download(2);
    let config = config_in(&temp, &["@photo_shop"]);

    let summary = scrape::run(&source, &config).await.unwrap();

    let rows = read_rows(&config.output_csv);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][2], "3");
    assert!(summary.channels[0].outcome.is_skipped());
    assert!(media_files(&config.media_dir).is_empty());
}

#[tokio::test]
async fn invalid_reference_is_skipped_without_resolution() {
    let temp = tempfile::tempdir().unwrap();
    let source = FakeSource::new().with_channel("good_one", "Good", vec![FakeMessage::plain(1, "hi")]);
    let config = config_in(&temp, &["@bad name", "@good_one"]);

    let summary = scrape::run(&source, &config).await.unwrap();

    assert_eq!(source.resolved(), vec!["good_one"]);
    assert!(summary.channels[0].outcome.is_skipped());
    assert_eq!(summary.total_messages(), 1);
}

#[tokio::test]
async fn rerun_overwrites_with_identical_content() {
    let temp = tempfile::tempdir().unwrap();
    let source = FakeSource::new().with_channel(
        "repeat_shop",
        "Repeat",
        vec![FakeMessage::photo(2, Some("a, b")), FakeMessage::plain(1, "multi\nline")],
    );
    let config = config_in(&temp, &["@repeat_shop"]);

    scrape::run(&source, &config).await.unwrap();
    let first = fs::read(&config.output_csv).unwrap();

    scrape::run(&source, &config).await.unwrap();
    let second = fs::read(&config.output_csv).unwrap();

    assert_eq!(first, second);
    assert_eq!(media_files(&config.media_dir), vec!["repeat_shop_2.jpg"]);
}

#[tokio::test]
async fn empty_channel_list_still_writes_header() {
    let temp = tempfile::tempdir().unwrap();
    let config = config_in(&temp, &[]);

    let summary = scrape::run(&FakeSource::new(), &config).await.unwrap();

    assert!(summary.channels.is_empty());
    let content = fs::read_to_string(&config.output_csv).unwrap();
    assert_eq!(content, "Channel Title,Channel Username,ID,Message,Date,Media Path\n");
    assert!(config.media_dir.is_dir());
}

#[tokio::test]
async fn limit_caps_messages_per_channel() {
    let temp = tempfile::tempdir().unwrap();
    let source = FakeSource::new().with_channel(
        "busy_channel",
        "Busy",
        (1..=10).rev().map(|id| FakeMessage::plain(id, "msg")).collect(),
    );
    let mut config = config_in(&temp, &["@busy_channel"]);
    config.limit = Some(4);

    let summary = scrape::run(&source, &config).await.unwrap();

    assert_eq!(summary.total_messages(), 4);
    let ids: Vec<String> = read_rows(&config.output_csv).into_iter().map(|r| r[2].clone()).collect();
    assert_eq!(ids, vec!["10", "9", "8", "7"]);
}

#[tokio::test(start_paused = true)]
async fn delay_is_applied_before_each_channel() {
    let temp = tempfile::tempdir().unwrap();
    let source = FakeSource::new()
        .with_channel("chan_one", "One", vec![])
        .with_channel("chan_two", "Two", vec![]);
    let mut config = config_in(&temp, &["@chan_one", "@chan_two"]);
    config.delay = Duration::from_secs(2);

    let started = tokio::time::Instant::now();
    scrape::run(&source, &config).await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(4));
}

#[tokio::test]
async fn scrape_channel_reports_missing_channel() {
    let temp = tempfile::tempdir().unwrap();
    let mut writer = RecordWriter::new(Vec::new()).unwrap();
    let channel = ChannelRef::parse("@private_channel").unwrap();

    let outcome = scrape_channel(&FakeSource::new(), &channel, &mut writer, temp.path(), None).await;

    match outcome {
        ChannelOutcome::Skipped {
            reason,
            messages,
            photos,
        } => {
            assert!(reason.contains("@private_channel"));
            assert_eq!(messages, 0);
            assert_eq!(photos, 0);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(writer.rows(), 0);
}
