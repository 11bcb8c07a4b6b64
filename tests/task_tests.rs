mod common;

use common::{at, date, wednesday, Fixture};
use hoteltask::{Error, NewTask, TaskEdit, TaskStore};

#[test]
fn test_toggle_sets_and_clears_done_at() {
    let fx = Fixture::new();
    let (t, _) = fx.svc.create_if_absent(NewTask::new("Fold towels", date(2025, 1, 10)), wednesday()).unwrap();

    let done_at = at(2025, 1, 10, 14, 5);
    let done = fx.svc.toggle_task(t.id, done_at).unwrap();
    assert!(done.is_done);
    assert_eq!(done.done_at, Some(done_at));

    let reopened = fx.svc.toggle_task(t.id, at(2025, 1, 10, 15, 0)).unwrap();
    assert!(!reopened.is_done);
    assert_eq!(reopened.done_at, None);
    assert_eq!(fx.svc.get_task(t.id).unwrap(), reopened);
    assert_eq!(fx.events.names(), vec!["task.created", "task.toggled", "task.toggled"]);
}

#[test]
fn test_reopen_refused_while_twin_is_open() {
    let fx = Fixture::new();
    let d = date(2025, 1, 10);
    let (first, _) = fx.svc.create_if_absent(NewTask::new("Fold towels", d), wednesday()).unwrap();
    fx.svc.toggle_task(first.id, wednesday()).unwrap();
    fx.svc.create_if_absent(NewTask::new("Fold towels", d), wednesday()).unwrap();

    let err = fx.svc.toggle_task(first.id, wednesday()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{err}");
    assert!(fx.svc.get_task(first.id).unwrap().is_done);
}

#[test]
fn test_edit_changes_fields() {
    let fx = Fixture::new();
    let (t, _) = fx.svc.create_if_absent(NewTask::new("Fold towels", date(2025, 1, 10)), wednesday()).unwrap();

    let edited = fx
        .svc
        .edit_task(
            t.id,
            TaskEdit {
                title: Some("  Fold bath towels ".into()),
                due_date: Some(date(2025, 1, 11)),
                display_order: Some(7),
            },
        )
        .unwrap();
    assert_eq!(edited.title, "Fold bath towels");
    assert_eq!(edited.due_date, date(2025, 1, 11));
    assert_eq!(edited.display_order, 7);
    assert_eq!(edited.created_at, t.created_at);

    let untouched = fx.svc.edit_task(t.id, TaskEdit::default()).unwrap();
    assert_eq!(untouched, edited);
}

#[test]
fn test_edit_cannot_create_an_open_twin() {
    let fx = Fixture::new();
    fx.svc.create_if_absent(NewTask::new("Fold towels", date(2025, 1, 11)), wednesday()).unwrap();
    let (other, _) = fx.svc.create_if_absent(NewTask::new("Fold towels", date(2025, 1, 10)), wednesday()).unwrap();

    let err = fx
        .svc
        .edit_task(other.id, TaskEdit { due_date: Some(date(2025, 1, 11)), ..Default::default() })
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(fx.svc.get_task(other.id).unwrap().due_date, date(2025, 1, 10));
}

#[test]
fn test_edit_rejects_blank_title() {
    let fx = Fixture::new();
    let (t, _) = fx.svc.create_if_absent(NewTask::new("Fold towels", date(2025, 1, 10)), wednesday()).unwrap();
    let err = fx.svc.edit_task(t.id, TaskEdit { title: Some(" ".into()), ..Default::default() }).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_missing_task_is_not_found() {
    let fx = Fixture::new();
    assert!(matches!(fx.svc.get_task(42), Err(Error::NotFound(42))));
    assert!(matches!(fx.svc.toggle_task(42, wednesday()), Err(Error::NotFound(42))));
    assert!(matches!(fx.svc.remove_task(42), Err(Error::NotFound(42))));
    assert!(!fx.svc.store().tasks_path().exists());
}

#[test]
fn test_remove_task() {
    let fx = Fixture::new();
    let (a, _) = fx.svc.create_if_absent(NewTask::new("A", date(2025, 1, 10)), wednesday()).unwrap();
    let (b, _) = fx.svc.create_if_absent(NewTask::new("B", date(2025, 1, 10)), wednesday()).unwrap();

    assert_eq!(fx.svc.remove_task(a.id).unwrap(), a);
    assert_eq!(fx.svc.store().load_tasks().unwrap(), vec![b]);

    // Ids keep growing from the highest remaining one.
    let (c, _) = fx.svc.create_if_absent(NewTask::new("C", date(2025, 1, 10)), wednesday()).unwrap();
    assert_eq!(c.id, 3);
}

#[test]
fn test_clear_keeps_definitions() {
    let fx = Fixture::new();
    fx.svc
        .submit(NewTask::new("Water plants", date(2025, 1, 12)).recurring(true), wednesday())
        .unwrap();
    fx.svc.create_if_absent(NewTask::new("Fix lamp", date(2025, 1, 12)), wednesday()).unwrap();

    assert_eq!(fx.svc.clear_tasks(true).unwrap(), 2);
    assert_eq!(fx.svc.store().load_tasks().unwrap().len(), 2);

    assert_eq!(fx.svc.clear_tasks(false).unwrap(), 2);
    assert!(fx.svc.store().load_tasks().unwrap().is_empty());
    assert_eq!(fx.svc.list_definitions().unwrap().len(), 1);
    assert!(fx.events.names().contains(&"tasks.cleared"));
}
