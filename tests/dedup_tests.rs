mod common;

use std::fs;

use common::{at, date, wednesday, Fixture};
use hoteltask::dedup::{next_display_order, parse_due_date, MAX_TITLE_LEN};
use hoteltask::{Error, NewTask, Outcome, TaskStore};

#[test]
fn test_second_request_is_a_duplicate() {
    let fx = Fixture::new();
    let (first, o1) = fx.svc.create_if_absent(NewTask::new("Clean lobby", date(2025, 1, 10)), wednesday()).unwrap();
    let (second, o2) = fx.svc.create_if_absent(NewTask::new("Clean lobby", date(2025, 1, 10)), wednesday()).unwrap();

    assert_eq!(o1, Outcome::Created);
    assert_eq!(o2, Outcome::Duplicate);
    assert_eq!(first, second);

    let tasks = fx.svc.store().load_tasks().unwrap();
    assert_eq!(tasks.iter().filter(|t| t.is_open()).count(), 1);
    assert_eq!(fx.events.names(), vec!["task.created", "task.duplicate"]);
}

#[test]
fn test_duplicate_leaves_existing_task_untouched() {
    let fx = Fixture::new();
    let (orig, _) = fx
        .svc
        .create_if_absent(NewTask::new("Set up seminar room", date(2025, 1, 11)).with_display_order(4), wednesday())
        .unwrap();

    let later = at(2025, 1, 9, 8, 0);
    let (dup, outcome) = fx
        .svc
        .create_if_absent(
            NewTask::new("Set up seminar room", date(2025, 1, 11)).with_display_order(99).recurring(true),
            later,
        )
        .unwrap();

    assert_eq!(outcome, Outcome::Duplicate);
    assert_eq!(dup.display_order, 4);
    assert_eq!(dup.created_at, orig.created_at);
    assert!(!dup.is_recurring);
    assert_eq!(fx.svc.store().load_tasks().unwrap(), vec![orig]);
}

#[test]
fn test_completed_task_does_not_block_new_one() {
    let fx = Fixture::new();
    let (first, _) = fx.svc.create_if_absent(NewTask::new("Clean lobby", date(2025, 1, 10)), wednesday()).unwrap();
    fx.svc.toggle_task(first.id, at(2025, 1, 10, 9, 0)).unwrap();

    let (second, outcome) = fx.svc.create_if_absent(NewTask::new("Clean lobby", date(2025, 1, 10)), wednesday()).unwrap();
    assert_eq!(outcome, Outcome::Created);
    assert_ne!(first.id, second.id);

    let tasks = fx.svc.store().load_tasks().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks.iter().filter(|t| t.is_done).count(), 1);
    assert_eq!(tasks.iter().filter(|t| t.is_open()).count(), 1);
    // The done one is still done.
    assert!(tasks.iter().find(|t| t.id == first.id).unwrap().is_done);
}

#[test]
fn test_titles_are_trimmed_then_matched_exactly() {
    let fx = Fixture::new();
    let d = date(2025, 1, 10);
    let (t, _) = fx.svc.create_if_absent(NewTask::new("  Clean lobby  ", d), wednesday()).unwrap();
    assert_eq!(t.title, "Clean lobby");

    let (_, o) = fx.svc.create_if_absent(NewTask::new("Clean lobby", d), wednesday()).unwrap();
    assert_eq!(o, Outcome::Duplicate);

    let (_, o) = fx.svc.create_if_absent(NewTask::new("clean lobby", d), wednesday()).unwrap();
    assert_eq!(o, Outcome::Created);
}

#[test]
fn test_same_title_on_another_day_is_not_a_duplicate() {
    let fx = Fixture::new();
    let (_, o1) = fx.svc.create_if_absent(NewTask::new("Check cakes", date(2025, 1, 10)), wednesday()).unwrap();
    let (_, o2) = fx.svc.create_if_absent(NewTask::new("Check cakes", date(2025, 1, 11)), wednesday()).unwrap();
    assert_eq!((o1, o2), (Outcome::Created, Outcome::Created));
}

#[test]
fn test_invalid_titles_touch_nothing() {
    let fx = Fixture::new();
    let too_long = "x".repeat(MAX_TITLE_LEN + 1);
    for title in ["", "   ", too_long.as_str()] {
        let err = fx.svc.create_if_absent(NewTask::new(title, date(2025, 1, 10)), wednesday()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{title:?}: {err}");
    }
    assert!(!fx.svc.store().tasks_path().exists());
    assert!(fx.events.events().is_empty());

    let ok = "x".repeat(MAX_TITLE_LEN);
    assert!(fx.svc.create_if_absent(NewTask::new(ok, date(2025, 1, 10)), wednesday()).is_ok());
}

#[test]
fn test_parse_due_date() {
    assert_eq!(parse_due_date(" 2025-01-10 ").unwrap(), date(2025, 1, 10));
    assert!(matches!(parse_due_date("2025-02-30"), Err(Error::Validation(_))));
    assert!(matches!(parse_due_date("10/01/2025"), Err(Error::Validation(_))));
}

#[test]
fn test_display_order_defaults_to_next_slot_of_the_day() {
    let fx = Fixture::new();
    let fri = date(2025, 1, 10);
    let (a, _) = fx.svc.create_if_absent(NewTask::new("A", fri), wednesday()).unwrap();
    let (b, _) = fx.svc.create_if_absent(NewTask::new("B", fri), wednesday()).unwrap();
    let (c, _) = fx.svc.create_if_absent(NewTask::new("C", fri).with_display_order(10), wednesday()).unwrap();
    let (d, _) = fx.svc.create_if_absent(NewTask::new("D", fri), wednesday()).unwrap();
    let (sat, _) = fx.svc.create_if_absent(NewTask::new("A", date(2025, 1, 11)), wednesday()).unwrap();

    assert_eq!(
        [a.display_order, b.display_order, c.display_order, d.display_order, sat.display_order],
        [1, 2, 10, 11, 1]
    );
}

#[test]
fn test_missing_due_date_uses_target_weekend() {
    let fx = Fixture::new();
    let (t, _) = fx.svc.create_if_absent(NewTask::undated("Midweek request"), wednesday()).unwrap();
    assert_eq!(t.due_date, date(2025, 1, 10));

    let saturday = at(2025, 1, 11, 10, 0);
    let (t, _) = fx.svc.create_if_absent(NewTask::undated("Weekend request"), saturday).unwrap();
    assert_eq!(t.due_date, date(2025, 1, 11));
}

#[test]
fn test_created_task_fields() {
    let fx = Fixture::new();
    let now = wednesday();
    let (t, _) = fx
        .svc
        .create_if_absent(NewTask::new("Blow the terrace", date(2025, 1, 11)).recurring(true), now)
        .unwrap();
    assert_eq!(t.id, 1);
    assert!(!t.is_done);
    assert_eq!(t.done_at, None);
    assert_eq!(t.created_at, now);
    assert!(t.is_recurring);

    // Survives a restart.
    assert_eq!(fx.reopen().get_task(t.id).unwrap(), t);
}

#[test]
fn test_concurrent_requests_create_exactly_once() {
    let fx = Fixture::new();
    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                s.spawn(|| {
                    fx.svc
                        .create_if_absent(NewTask::new("Clean lobby", date(2025, 1, 10)), wednesday())
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let created = results.iter().filter(|(_, o)| *o == Outcome::Created).count();
    assert_eq!(created, 1);
    assert_eq!(results.iter().filter(|(_, o)| *o == Outcome::Duplicate).count(), 15);
    let id = results[0].0.id;
    assert!(results.iter().all(|(t, _)| t.id == id));
    assert_eq!(fx.svc.store().load_tasks().unwrap().len(), 1);
}

#[test]
fn test_unreadable_store_is_reported() {
    let fx = Fixture::new();
    fs::write(fx.svc.store().tasks_path(), "{ not json").unwrap();

    let err = fx.svc.create_if_absent(NewTask::new("Clean lobby", date(2025, 1, 10)), wednesday()).unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable(_)), "{err}");
    assert_eq!(fs::read_to_string(fx.svc.store().tasks_path()).unwrap(), "{ not json");
}

#[test]
fn test_separate_handles_keep_every_insert() {
    let fx = Fixture::new();
    let outcomes: Vec<Outcome> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let svc = fx.reopen();
                s.spawn(move || {
                    (0..10)
                        .map(|n| {
                            let title = format!("Room {worker}-{n}");
                            svc.create_if_absent(NewTask::new(title, date(2025, 1, 11)), wednesday()).unwrap().1
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });

    assert!(outcomes.iter().all(|o| *o == Outcome::Created));
    let tasks = fx.svc.store().load_tasks().unwrap();
    assert_eq!(tasks.len(), 80);
    let mut ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 80);
}

#[test]
fn test_separate_handles_create_exactly_once() {
    let fx = Fixture::new();
    for round in 0..5 {
        let title = format!("Check cakes {round}");
        let outcomes: Vec<Outcome> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let svc = fx.reopen();
                    let title = title.clone();
                    s.spawn(move || svc.create_if_absent(NewTask::new(title, date(2025, 1, 10)), wednesday()).unwrap().1)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(outcomes.iter().filter(|o| o.is_created()).count(), 1, "round {round}");
    }
    assert_eq!(fx.svc.store().load_tasks().unwrap().len(), 5);
}

#[test]
fn test_order_and_id_near_the_limit() {
    let fx = Fixture::new();
    let fri = date(2025, 1, 10);
    fx.svc.create_if_absent(NewTask::new("Last", fri).with_display_order(i64::MAX), wednesday()).unwrap();
    let (next, _) = fx.svc.create_if_absent(NewTask::new("After last", fri), wednesday()).unwrap();
    assert_eq!(next.display_order, i64::MAX);
    assert_eq!(next_display_order(&fx.svc.store().load_tasks().unwrap(), fri), i64::MAX);
}

#[test]
fn test_exhausted_ids_are_refused() {
    let fx = Fixture::new();
    let raw = r#"[{"id":18446744073709551615,"title":"Hand edited","due_date":"2025-01-10","created_at":"2025-01-08T12:00:00Z"}]"#;
    fs::write(fx.svc.store().tasks_path(), raw).unwrap();

    let err = fx.svc.create_if_absent(NewTask::new("Fold towels", date(2025, 1, 10)), wednesday()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");
    assert_eq!(fs::read_to_string(fx.svc.store().tasks_path()).unwrap(), raw);
}

#[test]
fn test_no_temporary_files_left_behind() {
    let fx = Fixture::new();
    for n in 0..3 {
        fx.svc.create_if_absent(NewTask::new(format!("T{n}"), date(2025, 1, 10)), wednesday()).unwrap();
    }
    let mut names: Vec<String> = fs::read_dir(fx.dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec![".lock", "tasks.json"]);
}
