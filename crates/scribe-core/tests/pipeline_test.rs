//! End-to-end pipeline tests: stub generator through extraction, assembly,
//! and transactional persistence against a real PostgreSQL.

use anyhow::{Result, bail};
use async_trait::async_trait;

use scribe_core::generator::Generator;
use scribe_core::wbs::{self, MeetingPlan, TaskDraft, run_pipeline};
use scribe_db::queries::{meetings, tasks, works};
use scribe_test_utils::{create_test_db, drop_test_db};

/// Generator double: returns canned text, or fails when none is set.
struct StubGenerator(Option<&'static str>);

#[async_trait]
impl Generator for StubGenerator {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        match self.0 {
            Some(text) => Ok(text.to_string()),
            None => bail!("model unavailable"),
        }
    }
}

const KEYED_RESPONSE: &str = concat!(
    "<title>Login & Landing</title>\n",
    "<summary>Two streams agreed.</summary>\n",
    "<wbs>{\"works\":[",
    "{\"field\":\"BE\",\"title\":\"Auth\",\"level\":2,\"tasks\":[\"schema\",\"login api\"]},",
    "{\"field\":\"FE\",\"title\":\"Landing\",\"level\":1,\"tasks\":[\"hero page\"]}",
    "],\"general_tasks\":[\"share notes\"]}</wbs>"
);

const LEGACY_RESPONSE: &str = concat!(
    "<title>Legacy Plan</title>\n",
    "<summary>Old shape.</summary>\n",
    "<wbs>[",
    "{\"field\":\"BE\",\"title\":\"Auth\",\"level\":2,\"tasks\":[\"t1\",\"t2\"]},",
    "{\"field\":\"FE\",\"title\":\"Landing\",\"level\":1,\"tasks\":[\"t3\"]}",
    "]</wbs>"
);

#[tokio::test]
async fn keyed_response_persists_full_hierarchy() {
    let (pool, db_name) = create_test_db().await;

    let generator = StubGenerator(Some(KEYED_RESPONSE));
    let meeting_id = run_pipeline(&pool, &generator, "We need login and a landing page")
        .await
        .expect("pipeline should succeed");

    let meeting = meetings::get_meeting(&pool, meeting_id)
        .await
        .unwrap()
        .expect("meeting should exist");
    assert_eq!(meeting.record, "We need login and a landing page");
    assert_eq!(meeting.title, "Login & Landing");
    assert_eq!(meeting.script, "Two streams agreed.");

    let linked_works = works::list_works_for_meeting(&pool, meeting_id)
        .await
        .unwrap();
    assert_eq!(linked_works.len(), 2);
    assert_eq!(linked_works[0].title, "Auth");
    assert_eq!(linked_works[0].work_order, 1);
    assert_eq!(linked_works[1].title, "Landing");
    assert_eq!(linked_works[1].work_order, 2);

    let auth_tasks = tasks::list_tasks_for_work(&pool, meeting_id, linked_works[0].id)
        .await
        .unwrap();
    let titles: Vec<&str> = auth_tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["schema", "login api"]);
    assert_eq!(auth_tasks[0].task_order, 1);
    assert_eq!(auth_tasks[1].task_order, 2);

    let general = tasks::list_general_tasks(&pool, meeting_id).await.unwrap();
    assert_eq!(general.len(), 1);
    assert_eq!(general[0].title, "share notes");
    assert_eq!(general[0].task_order, 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn legacy_array_response_has_no_general_tasks() {
    let (pool, db_name) = create_test_db().await;

    let generator = StubGenerator(Some(LEGACY_RESPONSE));
    let meeting_id = run_pipeline(&pool, &generator, "We need login and a landing page")
        .await
        .expect("pipeline should succeed");

    let linked_works = works::list_works_for_meeting(&pool, meeting_id)
        .await
        .unwrap();
    assert_eq!(linked_works.len(), 2);

    let all_tasks = tasks::list_tasks_for_meeting(&pool, meeting_id)
        .await
        .unwrap();
    assert_eq!(all_tasks.len(), 3);
    assert!(all_tasks.iter().all(|t| t.work_id.is_some()));

    let general = tasks::list_general_tasks(&pool, meeting_id).await.unwrap();
    assert!(general.is_empty());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn failed_generator_falls_back_to_error_meeting() {
    let (pool, db_name) = create_test_db().await;

    let generator = StubGenerator(None);
    let meeting_id = run_pipeline(&pool, &generator, "transcript")
        .await
        .expect("generator failure is recovered, pipeline still succeeds");

    let meeting = meetings::get_meeting(&pool, meeting_id)
        .await
        .unwrap()
        .expect("meeting should exist");
    assert_eq!(meeting.title, "Error");
    assert_eq!(meeting.script, "generation failed");
    // The original transcript is still recorded.
    assert_eq!(meeting.record, "transcript");

    let all_tasks = tasks::list_tasks_for_meeting(&pool, meeting_id)
        .await
        .unwrap();
    assert!(all_tasks.is_empty());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn blank_generator_output_falls_back_too() {
    let (pool, db_name) = create_test_db().await;

    let generator = StubGenerator(Some("   \n  "));
    let meeting_id = run_pipeline(&pool, &generator, "transcript")
        .await
        .expect("blank output is recovered");

    let meeting = meetings::get_meeting(&pool, meeting_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meeting.title, "Error");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn untagged_response_still_records_the_meeting() {
    let (pool, db_name) = create_test_db().await;

    let generator = StubGenerator(Some("model rambled with no tags"));
    let meeting_id = run_pipeline(&pool, &generator, "transcript")
        .await
        .expect("tag-free output degrades to an empty plan");

    let meeting = meetings::get_meeting(&pool, meeting_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(meeting.title, "");
    assert_eq!(meeting.script, "");

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn persist_plan_rejects_dangling_work_index() {
    let (pool, db_name) = create_test_db().await;

    // A task pointing past the works list is a programming error upstream;
    // the transaction must not leave partial rows behind.
    let plan = MeetingPlan {
        meeting: wbs::MeetingDraft {
            record: "r".to_string(),
            title: "t".to_string(),
            script: "s".to_string(),
        },
        works: vec![],
        tasks: vec![TaskDraft {
            work_index: Some(0),
            title: "dangling".to_string(),
            order: 1,
        }],
    };

    let task_pool = pool.clone();
    let joined = tokio::spawn(async move { wbs::persist_plan(&task_pool, &plan).await }).await;
    assert!(joined.is_err(), "out-of-bounds work index should panic");

    // The aborted transaction committed nothing.
    let all = meetings::list_meetings(&pool).await.unwrap();
    assert!(all.is_empty());

    pool.close().await;
    drop_test_db(&db_name).await;
}
