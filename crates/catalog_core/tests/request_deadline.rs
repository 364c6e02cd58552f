use catalog_core::db::{connect_db_with_deadline, open_db};
use catalog_core::{CatalogService, CatalogSettings, Deadline, VehicleFilter};
use std::time::{Duration, Instant};

const BUDGET: Duration = Duration::from_millis(100);
const PROMPT: Duration = Duration::from_secs(2);

#[test]
fn connect_gives_up_on_locked_file_within_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    let holder = open_db(&path).unwrap();
    holder.execute_batch("BEGIN EXCLUSIVE;").unwrap();

    let started = Instant::now();
    let result = connect_db_with_deadline(&path, &Deadline::after(BUDGET));

    assert!(result.is_err());
    assert!(started.elapsed() < PROMPT, "waited {:?}", started.elapsed());
}

#[test]
fn listing_gives_up_on_locked_file_within_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    let holder = open_db(&path).unwrap();

    let conn = connect_db_with_deadline(&path, &Deadline::after(BUDGET)).unwrap();
    let service = CatalogService::open(&conn, CatalogSettings::default()).unwrap();
    holder.execute_batch("BEGIN EXCLUSIVE;").unwrap();

    let started = Instant::now();
    let result = service.list_page(&VehicleFilter::default(), 1);

    assert!(result.is_err());
    assert!(started.elapsed() < PROMPT, "waited {:?}", started.elapsed());
}

#[test]
fn lock_released_in_time_does_not_fail_the_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    let holder = open_db(&path).unwrap();
    holder.execute_batch("BEGIN EXCLUSIVE;").unwrap();

    let release = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        holder.execute_batch("COMMIT;").unwrap();
    });

    let conn = connect_db_with_deadline(&path, &Deadline::after(Duration::from_secs(5))).unwrap();
    release.join().unwrap();
    let count: i64 = conn
        .query_row("SELECT count(*) FROM car;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
