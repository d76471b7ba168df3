// SPDX-FileCopyrightText: 2026 Archivist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end archive scenarios over the full pipeline with mock providers.

use archivist_core::types::{Attachment, AttachmentKind};
use archivist_pipeline::SearchMode;
use archivist_test_utils::{MockDescriber, TestHarness};

fn video(file_id: &str, size: u64) -> Attachment {
    Attachment {
        file_id: file_id.into(),
        size,
        kind: AttachmentKind::Video,
    }
}

#[tokio::test]
async fn bicycle_photo_is_found_and_oversized_video_is_not() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_media("photo-bike", "a red bicycle leaning against a brick wall").await;
    harness.add_media("video-cat", "a cat chasing a laser pointer").await;
    harness.add_media("photo-beach", "sunset over the beach").await;

    let report = harness.post_photo(-100, 1, "photo-bike", 15_000_000).await.unwrap();
    assert_eq!(report.archived, 1);

    let report = harness
        .post(-100, 2, vec![video("video-cat", 25_000_000)])
        .await
        .unwrap();
    assert_eq!(report.archived, 0);

    let beach = harness.post_photo(-100, 3, "photo-beach", 500_000).await.unwrap();
    assert_eq!(beach.archived, 1);

    let results = harness.search("bicycle").await.unwrap();
    assert_eq!(results[0].external_message_id, 1);
    assert!(results.iter().all(|m| m.external_message_id != 2));
    assert_eq!(harness.file_count().await.unwrap(), 2);
}

#[tokio::test]
async fn size_limit_boundary() {
    let harness = TestHarness::builder()
        .with_max_file_size(1_000)
        .build()
        .await
        .unwrap();
    harness.add_media("exact", "cake").await;
    harness.add_media("under", "cake").await;

    assert_eq!(harness.post_photo(-1, 1, "exact", 1_000).await.unwrap().archived, 0);
    assert_eq!(harness.post_photo(-1, 2, "under", 999).await.unwrap().archived, 1);
}

#[tokio::test]
async fn results_are_ordered_by_distance_and_limited_by_mode() {
    let harness = TestHarness::builder()
        .with_search_mode(SearchMode::Multi(2))
        .build()
        .await
        .unwrap();
    harness.add_media("dog", "a dog").await;
    harness.add_media("two-dogs", "a dog and another dog").await;
    harness.add_media("car", "a blue car").await;

    for (i, id) in ["dog", "two-dogs", "car"].iter().enumerate() {
        harness.post_photo(-7, i as i64 + 1, id, 10).await.unwrap();
    }

    let results = harness.search("dog").await.unwrap();
    let ids: Vec<i64> = results.iter().map(|m| m.external_message_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn most_similar_returns_one_message() {
    let harness = TestHarness::builder()
        .with_search_mode(SearchMode::MostSimilar)
        .build()
        .await
        .unwrap();
    harness.add_media("a", "a cat").await;
    harness.add_media("b", "a red car").await;
    harness.post_photo(-1, 1, "a", 10).await.unwrap();
    harness.post_photo(-1, 2, "b", 10).await.unwrap();

    let results = harness.search("red car").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].external_message_id, 2);
}

#[tokio::test]
async fn empty_archive_returns_nothing() {
    let harness = TestHarness::new().await.unwrap();
    assert!(harness.search("anything").await.unwrap().is_empty());
}

#[tokio::test]
async fn media_group_message_appears_once_in_results() {
    let harness = TestHarness::new().await.unwrap();
    harness.add_media("p1", "a cat").await;
    harness.add_media("p2", "a cat on a cat tree").await;
    harness
        .post(
            -5,
            9,
            vec![
                Attachment {
                    file_id: "p1".into(),
                    size: 10,
                    kind: AttachmentKind::Photo,
                },
                Attachment {
                    file_id: "p2".into(),
                    size: 10,
                    kind: AttachmentKind::Photo,
                },
            ],
        )
        .await
        .unwrap();

    let results = harness.search("cat").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].external_message_id, 9);
}

#[tokio::test]
async fn failed_description_can_be_recovered_by_reprocess() {
    let describer = MockDescriber::new();
    describer.fail_on("flaky").await;
    let harness = TestHarness::builder()
        .with_describer(describer)
        .build()
        .await
        .unwrap();
    harness.add_media("f", "flaky bicycle photo").await;

    let report = harness.post_photo(-1, 1, "f", 10).await.unwrap();
    assert_eq!(report.incomplete, 1);
    assert!(harness.search("bicycle").await.unwrap().is_empty());

    harness.describer.recover().await;
    let sweep = harness
        .ingestor
        .reprocess(10, &harness.fetcher, &harness.cancel)
        .await
        .unwrap();
    assert_eq!(sweep.archived, 1);
    assert_eq!(harness.search("bicycle").await.unwrap()[0].external_message_id, 1);
}
