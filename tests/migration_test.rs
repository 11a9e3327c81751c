mod helpers;

use orbit::db;
use orbit::db::migrations::{get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION};

#[test]
fn fresh_db_migrates_to_current_version() {
    let conn = helpers::test_db();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migrations_are_idempotent() {
    let mut conn = helpers::test_db();
    run_migrations(&mut conn).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn manual_v1_db_upgrades_correctly() {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), 1);
    let has_summary: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('conversations') WHERE name = 'summary'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(!has_summary);

    run_migrations(&mut conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    let has_summary: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('conversations') WHERE name = 'summary'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert!(has_summary);
}

#[test]
fn file_database_reopens_at_current_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orbit.db");

    {
        let mut conn = db::open_database(&path).unwrap();
        helpers::contact(
            &mut conn,
            "Ada",
            orbit::relationship::types::Layer::Vip,
            orbit::relationship::types::Frequency::Weekly,
        );
    }

    let conn = db::open_database(&path).unwrap();
    let report = db::check_database_health(&conn).unwrap();
    assert_eq!(report.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(report.contact_count, 1);
    assert_eq!(report.log_count, 1);
    assert!(report.integrity_ok);
}
