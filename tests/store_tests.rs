// Tests for the in-memory progress store: daily accumulation, achievement
// thresholds, and recent-session queries.

use chrono::{NaiveDate, Utc};

use talkdrill::store::{
    MemoryStore, ProgressDelta, ProgressStore, SessionRecord, ACHIEVEMENT_FIVE_A_DAY,
    ACHIEVEMENT_HIGH_SCORE,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, d).expect("valid date")
}

fn delta(user: &str, date: NaiveDate, score: u8, duration_secs: u64) -> ProgressDelta {
    ProgressDelta {
        user_id: user.to_string(),
        date,
        score,
        duration_secs,
    }
}

fn record(user: &str, date: NaiveDate, question: &str) -> SessionRecord {
    SessionRecord {
        user_id: user.to_string(),
        date,
        question: question.to_string(),
        transcript: "an answer".to_string(),
        score: 72,
        duration_secs: 20,
        recorded_at: Utc::now(),
    }
}

#[tokio::test]
async fn daily_progress_accumulates_additively() {
    let store = MemoryStore::new();

    store
        .apply_progress(&delta("u1", day(7), 80, 30))
        .await
        .expect("apply");
    let progress = store
        .apply_progress(&delta("u1", day(7), 60, 45))
        .await
        .expect("apply");

    assert_eq!(progress.questions_answered, 2);
    assert_eq!(progress.total_score, 140);
    assert!((progress.average_score - 70.0).abs() < f32::EPSILON);
    assert_eq!(progress.total_duration_secs, 75);
}

#[tokio::test]
async fn days_and_users_are_independent() {
    let store = MemoryStore::new();

    store.apply_progress(&delta("u1", day(6), 90, 10)).await.expect("apply");
    store.apply_progress(&delta("u1", day(7), 50, 10)).await.expect("apply");
    store.apply_progress(&delta("u2", day(7), 70, 10)).await.expect("apply");

    let u1_today = store
        .daily_progress("u1", day(7))
        .await
        .expect("read")
        .expect("record exists");
    assert_eq!(u1_today.questions_answered, 1);
    assert_eq!(u1_today.total_score, 50);

    assert!(store.daily_progress("u3", day(7)).await.expect("read").is_none());
}

#[tokio::test]
async fn achievements_unlock_at_thresholds() {
    let store = MemoryStore::new();

    for _ in 0..4 {
        store.apply_progress(&delta("u1", day(7), 60, 30)).await.expect("apply");
    }
    let progress = store
        .daily_progress("u1", day(7))
        .await
        .expect("read")
        .expect("record exists");
    assert!(!progress.achievements.iter().any(|a| a == ACHIEVEMENT_FIVE_A_DAY));

    let progress = store
        .apply_progress(&delta("u1", day(7), 90, 30))
        .await
        .expect("apply");
    assert!(progress.achievements.iter().any(|a| a == ACHIEVEMENT_FIVE_A_DAY));
    assert!(progress.achievements.iter().any(|a| a == ACHIEVEMENT_HIGH_SCORE));
}

#[tokio::test]
async fn recent_sessions_are_newest_first_and_limited() {
    let store = MemoryStore::new();

    for i in 0..5 {
        store
            .append_session(&record("u1", day(7), &format!("question {}", i)))
            .await
            .expect("append");
    }
    store
        .append_session(&record("someone-else", day(7), "other question"))
        .await
        .expect("append");

    let recent = store.recent_sessions("u1", 3).await.expect("read");
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].question, "question 4");
    assert_eq!(recent[2].question, "question 2");
}
