// Database CRUD operations
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::codec::{decode_list, encode_list};
use super::db::{DbConnection, DbResult};
use super::models::{
    Bean, BeanSummary, BeanUpdate, BrewMethod, DrinkType, NewBean, NewShot, Shot, ShotUpdate,
    ShotWithBean,
};

const BEAN_COLUMNS: &str = "b.id, b.name, b.roaster, b.roastDate, b.notes, b.isActive, b.createdAt";

const SHOT_COLUMNS: &str = "s.id, s.beanId, s.grindSetting, s.doseGrams, s.yieldGrams, s.timeSeconds,
     s.tasteTags, s.shotCharacteristics, s.isDialed, s.drinkType, s.brewMethod, s.notes, s.createdAt";

// Number of columns in SHOT_COLUMNS; joined bean fields follow them.
const SHOT_COLUMN_COUNT: usize = 13;

// ==================== ROW MAPPING ====================

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// Millisecond precision keeps the stored text fixed-width, so string order is time order.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn timestamp_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn timestamp_from_row(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn bean_from_row(row: &Row) -> rusqlite::Result<Bean> {
    Ok(Bean {
        id: row.get(0)?,
        name: row.get(1)?,
        roaster: row.get(2)?,
        roast_date: row.get(3)?,
        notes: row.get(4)?,
        is_active: row.get::<_, i64>(5)? != 0,
        created_at: timestamp_from_row(row, 6)?,
    })
}

fn shot_from_row(row: &Row) -> rusqlite::Result<Shot> {
    Ok(Shot {
        id: row.get(0)?,
        bean_id: row.get(1)?,
        grind_setting: row.get(2)?,
        dose_grams: row.get(3)?,
        yield_grams: row.get(4)?,
        time_seconds: row.get(5)?,
        taste_tags: decode_list(row.get::<_, Option<String>>(6)?.as_deref()),
        shot_characteristics: decode_list(row.get::<_, Option<String>>(7)?.as_deref()),
        is_dialed: row.get::<_, i64>(8)? != 0,
        drink_type: DrinkType::from_column(row.get::<_, Option<String>>(9)?.as_deref()),
        brew_method: BrewMethod::from_column(row.get::<_, Option<String>>(10)?.as_deref()),
        notes: row.get(11)?,
        created_at: timestamp_from_row(row, 12)?,
    })
}

fn shot_with_bean_from_row(row: &Row) -> rusqlite::Result<ShotWithBean> {
    Ok(ShotWithBean {
        shot: shot_from_row(row)?,
        bean_name: row.get(SHOT_COLUMN_COUNT)?,
        bean_roaster: row.get(SHOT_COLUMN_COUNT + 1)?,
    })
}

// ==================== BEAN QUERIES ====================

/// Create a new bean. New beans are never active.
pub fn create_bean(db: &DbConnection, input: NewBean) -> DbResult<Bean> {
    let bean = Bean {
        id: new_id(),
        name: input.name,
        roaster: input.roaster,
        roast_date: input.roast_date,
        notes: input.notes,
        is_active: false,
        created_at: now(),
    };

    let conn = db.lock();
    conn.execute(
        "INSERT INTO beans (id, name, roaster, roastDate, notes, isActive, createdAt)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![
            bean.id,
            bean.name,
            bean.roaster,
            bean.roast_date,
            bean.notes,
            timestamp_to_sql(&bean.created_at),
        ],
    )?;

    Ok(bean)
}

/// Apply the supplied fields of a partial update; an empty update is a no-op
pub fn update_bean(db: &DbConnection, id: &str, update: BeanUpdate) -> DbResult<()> {
    if update.is_empty() {
        return Ok(());
    }

    let mut assignments: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(name) = update.name {
        assignments.push("name = ?");
        values.push(Value::Text(name));
    }
    if let Some(roaster) = update.roaster {
        assignments.push("roaster = ?");
        values.push(Value::Text(roaster));
    }
    if let Some(roast_date) = update.roast_date {
        assignments.push("roastDate = ?");
        values.push(optional_text(roast_date));
    }
    if let Some(notes) = update.notes {
        assignments.push("notes = ?");
        values.push(optional_text(notes));
    }

    values.push(Value::Text(id.to_string()));
    let sql = format!("UPDATE beans SET {} WHERE id = ?", assignments.join(", "));

    let conn = db.lock();
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

/// Delete a bean and every shot recorded against it
pub fn delete_bean(db: &DbConnection, id: &str) -> DbResult<()> {
    let mut conn = db.lock();
    let tx = conn.transaction()?;

    // Explicit child delete keeps the cascade intact on databases where the
    // foreign key was never declared or enforcement is off.
    let shots_removed = tx.execute("DELETE FROM shots WHERE beanId = ?1", params![id])?;
    let beans_removed = tx.execute("DELETE FROM beans WHERE id = ?1", params![id])?;

    tx.commit()?;

    if beans_removed > 0 {
        log::info!("Deleted bean {} and {} shot(s)", id, shots_removed);
    }
    Ok(())
}

/// List all beans, active first, then newest first
pub fn list_beans(db: &DbConnection) -> DbResult<Vec<Bean>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(&format!(
        "SELECT {BEAN_COLUMNS}
         FROM beans b
         ORDER BY b.isActive DESC, b.createdAt DESC, b.rowid DESC"
    ))?;

    let beans = stmt
        .query_map([], bean_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(beans)
}

/// Get a bean by ID
pub fn get_bean(db: &DbConnection, id: &str) -> DbResult<Option<Bean>> {
    let conn = db.lock();
    let bean = conn
        .query_row(
            &format!("SELECT {BEAN_COLUMNS} FROM beans b WHERE b.id = ?1"),
            [id],
            bean_from_row,
        )
        .optional()?;

    Ok(bean)
}

/// Make `id` the only active bean.
///
/// Returns `false` and leaves the current active bean alone when no bean has
/// that id.
pub fn set_active_bean(db: &DbConnection, id: &str) -> DbResult<bool> {
    let mut conn = db.lock();
    let tx = conn.transaction()?;

    let exists = tx
        .query_row("SELECT 1 FROM beans WHERE id = ?1", [id], |_| Ok(()))
        .optional()?
        .is_some();
    if !exists {
        log::warn!("Cannot activate unknown bean {}", id);
        return Ok(false);
    }

    tx.execute("UPDATE beans SET isActive = 0 WHERE isActive != 0", [])?;
    tx.execute("UPDATE beans SET isActive = 1 WHERE id = ?1", [id])?;
    tx.commit()?;

    log::info!("Active bean is now {}", id);
    Ok(true)
}

/// Get the active bean, if any
pub fn get_active_bean(db: &DbConnection) -> DbResult<Option<Bean>> {
    let conn = db.lock();
    let bean = conn
        .query_row(
            &format!("SELECT {BEAN_COLUMNS} FROM beans b WHERE b.isActive != 0 LIMIT 1"),
            [],
            bean_from_row,
        )
        .optional()?;

    Ok(bean)
}

/// List all beans with their shot counts and current dialed shot
pub fn list_bean_summaries(db: &DbConnection) -> DbResult<Vec<BeanSummary>> {
    // One lock for the whole read so counts and dialed shots agree.
    let conn = db.lock();
    let counted = {
        let mut stmt = conn.prepare(&format!(
            "SELECT {BEAN_COLUMNS}, COUNT(s.id) AS shot_count
             FROM beans b
             LEFT JOIN shots s ON s.beanId = b.id
             GROUP BY b.id
             ORDER BY b.isActive DESC, b.createdAt DESC, b.rowid DESC"
        ))?;

        let rows = stmt
            .query_map([], |row| Ok((bean_from_row(row)?, row.get::<_, i64>(7)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    let mut summaries = Vec::with_capacity(counted.len());
    for (bean, shot_count) in counted {
        let dialed_shot = dialed_shot_in(&conn, &bean.id)?;
        summaries.push(BeanSummary {
            bean,
            shot_count,
            dialed_shot,
        });
    }

    Ok(summaries)
}

// ==================== SHOT QUERIES ====================

/// Record a new shot
pub fn create_shot(db: &DbConnection, input: NewShot) -> DbResult<Shot> {
    let shot = Shot {
        id: new_id(),
        bean_id: input.bean_id,
        grind_setting: input.grind_setting,
        dose_grams: input.dose_grams,
        yield_grams: input.yield_grams,
        time_seconds: input.time_seconds,
        taste_tags: input.taste_tags,
        shot_characteristics: input.shot_characteristics,
        is_dialed: input.is_dialed,
        drink_type: input.drink_type,
        brew_method: input.brew_method,
        notes: input.notes,
        created_at: now(),
    };

    let conn = db.lock();
    conn.execute(
        "INSERT INTO shots (id, beanId, grindSetting, doseGrams, yieldGrams, timeSeconds, tasteTags,
                            shotCharacteristics, isDialed, drinkType, brewMethod, notes, createdAt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            shot.id,
            shot.bean_id,
            shot.grind_setting,
            shot.dose_grams,
            shot.yield_grams,
            shot.time_seconds,
            encode_list(&shot.taste_tags),
            encode_list(&shot.shot_characteristics),
            shot.is_dialed,
            shot.drink_type.map(|d| d.as_str()),
            shot.brew_method.as_str(),
            shot.notes,
            timestamp_to_sql(&shot.created_at),
        ],
    )?;

    Ok(shot)
}

/// Apply the supplied fields of a partial update; an empty update is a no-op
pub fn update_shot(db: &DbConnection, id: &str, update: ShotUpdate) -> DbResult<()> {
    let mut assignments: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(grind_setting) = update.grind_setting {
        assignments.push("grindSetting = ?");
        values.push(Value::Integer(grind_setting));
    }
    if let Some(dose_grams) = update.dose_grams {
        assignments.push("doseGrams = ?");
        values.push(Value::Real(dose_grams));
    }
    if let Some(yield_grams) = update.yield_grams {
        assignments.push("yieldGrams = ?");
        values.push(Value::Real(yield_grams));
    }
    if let Some(time_seconds) = update.time_seconds {
        assignments.push("timeSeconds = ?");
        values.push(Value::Integer(time_seconds));
    }
    if let Some(taste_tags) = update.taste_tags {
        assignments.push("tasteTags = ?");
        values.push(Value::Text(encode_list(&taste_tags)));
    }
    if let Some(characteristics) = update.shot_characteristics {
        assignments.push("shotCharacteristics = ?");
        values.push(Value::Text(encode_list(&characteristics)));
    }
    if let Some(is_dialed) = update.is_dialed {
        assignments.push("isDialed = ?");
        values.push(Value::Integer(i64::from(is_dialed)));
    }
    if let Some(drink_type) = update.drink_type {
        assignments.push("drinkType = ?");
        values.push(optional_text(drink_type.map(|d| d.as_str().to_string())));
    }
    if let Some(brew_method) = update.brew_method {
        assignments.push("brewMethod = ?");
        values.push(Value::Text(brew_method.as_str().to_string()));
    }
    if let Some(notes) = update.notes {
        assignments.push("notes = ?");
        values.push(optional_text(notes));
    }

    if assignments.is_empty() {
        return Ok(());
    }

    values.push(Value::Text(id.to_string()));
    let sql = format!("UPDATE shots SET {} WHERE id = ?", assignments.join(", "));

    let conn = db.lock();
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

/// Delete a shot
pub fn delete_shot(db: &DbConnection, id: &str) -> DbResult<()> {
    let conn = db.lock();
    conn.execute("DELETE FROM shots WHERE id = ?1", params![id])?;
    Ok(())
}

/// List shots with their bean's name and roaster, newest first.
/// Restricted to one bean when `bean_id` is given.
pub fn list_shots(db: &DbConnection, bean_id: Option<&str>) -> DbResult<Vec<ShotWithBean>> {
    let conn = db.lock();
    let filter = if bean_id.is_some() {
        "WHERE s.beanId = ?1"
    } else {
        ""
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {SHOT_COLUMNS}, b.name, b.roaster
         FROM shots s
         JOIN beans b ON s.beanId = b.id
         {filter}
         ORDER BY s.createdAt DESC, s.rowid DESC"
    ))?;

    let rows = match bean_id {
        Some(bean_id) => stmt.query_map([bean_id], shot_with_bean_from_row)?,
        None => stmt.query_map([], shot_with_bean_from_row)?,
    };
    let shots = rows.collect::<Result<Vec<_>, _>>()?;

    Ok(shots)
}

/// Get a shot by ID, joined with its bean
pub fn get_shot(db: &DbConnection, id: &str) -> DbResult<Option<ShotWithBean>> {
    let conn = db.lock();
    let shot = conn
        .query_row(
            &format!(
                "SELECT {SHOT_COLUMNS}, b.name, b.roaster
                 FROM shots s
                 JOIN beans b ON s.beanId = b.id
                 WHERE s.id = ?1"
            ),
            [id],
            shot_with_bean_from_row,
        )
        .optional()?;

    Ok(shot)
}

/// Most recent shot for a bean
pub fn get_last_shot_for_bean(db: &DbConnection, bean_id: &str) -> DbResult<Option<Shot>> {
    let conn = db.lock();
    let shot = conn
        .query_row(
            &format!(
                "SELECT {SHOT_COLUMNS}
                 FROM shots s
                 WHERE s.beanId = ?1
                 ORDER BY s.createdAt DESC, s.rowid DESC
                 LIMIT 1"
            ),
            [bean_id],
            shot_from_row,
        )
        .optional()?;

    Ok(shot)
}

/// Most recent dialed shot for a bean: the bean's current recipe
pub fn get_dialed_shot_for_bean(db: &DbConnection, bean_id: &str) -> DbResult<Option<Shot>> {
    let conn = db.lock();
    dialed_shot_in(&conn, bean_id)
}

fn dialed_shot_in(conn: &Connection, bean_id: &str) -> DbResult<Option<Shot>> {
    let shot = conn
        .query_row(
            &format!(
                "SELECT {SHOT_COLUMNS}
                 FROM shots s
                 WHERE s.beanId = ?1 AND s.isDialed != 0
                 ORDER BY s.createdAt DESC, s.rowid DESC
                 LIMIT 1"
            ),
            [bean_id],
            shot_from_row,
        )
        .optional()?;

    Ok(shot)
}

/// Number of shots recorded for a bean
pub fn count_shots_for_bean(db: &DbConnection, bean_id: &str) -> DbResult<i64> {
    let conn = db.lock();
    let count = conn.query_row(
        "SELECT COUNT(*) FROM shots WHERE beanId = ?1",
        [bean_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn optional_text(value: Option<String>) -> Value {
    value.map(Value::Text).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::db::{open_in_memory, DbError};
    use crate::state::models::{ShotCharacteristic, TasteTag};
    use proptest::prelude::*;

    fn new_bean(name: &str) -> NewBean {
        NewBean {
            name: name.to_string(),
            roaster: "Onyx".to_string(),
            roast_date: Some("2024-05-01".to_string()),
            notes: None,
        }
    }

    fn new_shot(bean_id: &str) -> NewShot {
        NewShot {
            bean_id: bean_id.to_string(),
            grind_setting: 14,
            dose_grams: 18.0,
            yield_grams: 36.0,
            time_seconds: 28,
            taste_tags: Vec::new(),
            shot_characteristics: Vec::new(),
            is_dialed: false,
            drink_type: None,
            brew_method: BrewMethod::Espresso,
            notes: None,
        }
    }

    fn active_count(db: &DbConnection) -> i64 {
        db.lock()
            .query_row("SELECT COUNT(*) FROM beans WHERE isActive != 0", [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn test_create_and_get_bean() {
        let db = open_in_memory().unwrap();
        let input = new_bean("Geisha");

        let created = create_bean(&db, input.clone()).unwrap();
        assert!(!created.is_active);
        assert_eq!(created.name, input.name);
        assert_eq!(created.roaster, input.roaster);
        assert_eq!(created.roast_date, input.roast_date);
        assert_eq!(created.notes, None);

        let fetched = get_bean(&db, &created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_get_missing_bean_is_none() {
        let db = open_in_memory().unwrap();
        assert!(get_bean(&db, "nope").unwrap().is_none());
        assert!(get_active_bean(&db).unwrap().is_none());
        assert!(get_shot(&db, "nope").unwrap().is_none());
        assert!(list_beans(&db).unwrap().is_empty());
        assert!(list_shots(&db, None).unwrap().is_empty());
    }

    #[test]
    fn test_update_bean_partial() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();
        set_active_bean(&db, &bean.id).unwrap();

        update_bean(
            &db,
            &bean.id,
            BeanUpdate {
                notes: Some(Some("jasmine".to_string())),
                roast_date: Some(None),
                ..Default::default()
            },
        )
        .unwrap();

        let updated = get_bean(&db, &bean.id).unwrap().unwrap();
        assert_eq!(updated.name, "Geisha");
        assert_eq!(updated.notes.as_deref(), Some("jasmine"));
        assert_eq!(updated.roast_date, None);
        assert!(updated.is_active);
        assert_eq!(updated.created_at, bean.created_at);
    }

    #[test]
    fn test_update_bean_empty_is_noop() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();

        update_bean(&db, &bean.id, BeanUpdate::default()).unwrap();

        assert_eq!(get_bean(&db, &bean.id).unwrap().unwrap(), bean);
    }

    #[test]
    fn test_list_beans_active_first_then_newest() {
        let db = open_in_memory().unwrap();
        let first = create_bean(&db, new_bean("First")).unwrap();
        let second = create_bean(&db, new_bean("Second")).unwrap();
        let third = create_bean(&db, new_bean("Third")).unwrap();

        set_active_bean(&db, &first.id).unwrap();

        let ids: Vec<String> = list_beans(&db).unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first.id, third.id, second.id]);
    }

    #[test]
    fn test_set_active_bean_is_exclusive() {
        let db = open_in_memory().unwrap();
        let a = create_bean(&db, new_bean("A")).unwrap();
        let b = create_bean(&db, new_bean("B")).unwrap();

        assert!(set_active_bean(&db, &a.id).unwrap());
        assert!(set_active_bean(&db, &b.id).unwrap());

        assert_eq!(active_count(&db), 1);
        assert_eq!(get_active_bean(&db).unwrap().unwrap().id, b.id);
        assert!(!get_bean(&db, &a.id).unwrap().unwrap().is_active);
    }

    #[test]
    fn test_set_active_unknown_bean_keeps_current() {
        let db = open_in_memory().unwrap();
        let a = create_bean(&db, new_bean("A")).unwrap();
        set_active_bean(&db, &a.id).unwrap();

        assert!(!set_active_bean(&db, "missing").unwrap());

        assert_eq!(get_active_bean(&db).unwrap().unwrap().id, a.id);
    }

    #[test]
    fn test_delete_bean_cascades_to_shots() {
        let db = open_in_memory().unwrap();
        let doomed = create_bean(&db, new_bean("Doomed")).unwrap();
        let kept = create_bean(&db, new_bean("Kept")).unwrap();
        for _ in 0..3 {
            create_shot(&db, new_shot(&doomed.id)).unwrap();
        }
        let survivor = create_shot(&db, new_shot(&kept.id)).unwrap();

        delete_bean(&db, &doomed.id).unwrap();

        assert!(get_bean(&db, &doomed.id).unwrap().is_none());
        assert_eq!(count_shots_for_bean(&db, &doomed.id).unwrap(), 0);
        let remaining: Vec<String> = list_shots(&db, None)
            .unwrap()
            .into_iter()
            .map(|s| s.shot.id)
            .collect();
        assert_eq!(remaining, vec![survivor.id]);
    }

    #[test]
    fn test_delete_bean_cascades_without_foreign_key_enforcement() {
        let db = open_in_memory().unwrap();
        db.lock().execute("PRAGMA foreign_keys = OFF", []).unwrap();
        let bean = create_bean(&db, new_bean("Doomed")).unwrap();
        create_shot(&db, new_shot(&bean.id)).unwrap();

        delete_bean(&db, &bean.id).unwrap();

        let orphans: i64 = db
            .lock()
            .query_row("SELECT COUNT(*) FROM shots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[test]
    fn test_create_shot_round_trips_lists() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();

        let mut input = new_shot(&bean.id);
        input.taste_tags = vec![TasteTag::Sour, TasteTag::Bitter];
        input.shot_characteristics = vec![ShotCharacteristic::Channeling, ShotCharacteristic::FastFlow];
        input.drink_type = Some(DrinkType::Latte);
        input.brew_method = BrewMethod::Aeropress;
        input.notes = Some("thin".to_string());
        let created = create_shot(&db, input).unwrap();

        let fetched = get_shot(&db, &created.id).unwrap().unwrap();
        assert_eq!(fetched.shot, created);
        assert_eq!(fetched.shot.taste_tags, vec![TasteTag::Sour, TasteTag::Bitter]);
        assert_eq!(fetched.bean_name, "Geisha");
        assert_eq!(fetched.bean_roaster, "Onyx");
    }

    #[test]
    fn test_create_shot_for_missing_bean_fails() {
        let db = open_in_memory().unwrap();
        assert!(create_shot(&db, new_shot("ghost")).is_err());
    }

    #[test]
    fn test_garbled_list_column_reads_as_empty() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();
        let shot = create_shot(&db, new_shot(&bean.id)).unwrap();
        db.lock()
            .execute(
                "UPDATE shots SET tasteTags = 'sour,bitter', brewMethod = NULL WHERE id = ?1",
                [&shot.id],
            )
            .unwrap();

        let fetched = get_shot(&db, &shot.id).unwrap().unwrap().shot;
        assert!(fetched.taste_tags.is_empty());
        assert_eq!(fetched.brew_method, BrewMethod::Espresso);
    }

    #[test]
    fn test_update_shot_partial() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();
        let mut input = new_shot(&bean.id);
        input.drink_type = Some(DrinkType::Cappuccino);
        let shot = create_shot(&db, input).unwrap();

        update_shot(
            &db,
            &shot.id,
            ShotUpdate {
                grind_setting: Some(11),
                taste_tags: Some(vec![TasteTag::Balanced]),
                is_dialed: Some(true),
                drink_type: Some(None),
                brew_method: Some(BrewMethod::MokaPot),
                ..Default::default()
            },
        )
        .unwrap();

        let updated = get_shot(&db, &shot.id).unwrap().unwrap().shot;
        assert_eq!(updated.grind_setting, 11);
        assert_eq!(updated.dose_grams, shot.dose_grams);
        assert_eq!(updated.taste_tags, vec![TasteTag::Balanced]);
        assert!(updated.is_dialed);
        assert_eq!(updated.drink_type, None);
        assert_eq!(updated.brew_method, BrewMethod::MokaPot);
        assert_eq!(updated.bean_id, shot.bean_id);
        assert_eq!(updated.created_at, shot.created_at);

        update_shot(&db, &shot.id, ShotUpdate::default()).unwrap();
        assert_eq!(get_shot(&db, &shot.id).unwrap().unwrap().shot, updated);
    }

    #[test]
    fn test_delete_shot() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();
        let shot = create_shot(&db, new_shot(&bean.id)).unwrap();

        delete_shot(&db, &shot.id).unwrap();

        assert!(get_shot(&db, &shot.id).unwrap().is_none());
        assert!(get_bean(&db, &bean.id).unwrap().is_some());
    }

    #[test]
    fn test_list_shots_filters_and_orders_newest_first() {
        let db = open_in_memory().unwrap();
        let a = create_bean(&db, new_bean("A")).unwrap();
        let b = create_bean(&db, new_bean("B")).unwrap();
        let a1 = create_shot(&db, new_shot(&a.id)).unwrap();
        let b1 = create_shot(&db, new_shot(&b.id)).unwrap();
        let a2 = create_shot(&db, new_shot(&a.id)).unwrap();

        let all: Vec<String> = list_shots(&db, None)
            .unwrap()
            .into_iter()
            .map(|s| s.shot.id)
            .collect();
        assert_eq!(all, vec![a2.id.clone(), b1.id, a1.id.clone()]);

        let only_a = list_shots(&db, Some(&a.id)).unwrap();
        assert_eq!(only_a.len(), 2);
        assert_eq!(only_a[0].shot.id, a2.id);
        assert_eq!(only_a[1].shot.id, a1.id);
        assert!(only_a.iter().all(|s| s.bean_name == "A"));
    }

    #[test]
    fn test_last_and_dialed_shot_for_bean() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();

        assert!(get_last_shot_for_bean(&db, &bean.id).unwrap().is_none());

        let mut dialed = new_shot(&bean.id);
        dialed.is_dialed = true;
        let older_dialed = create_shot(&db, dialed.clone()).unwrap();
        assert_eq!(
            get_dialed_shot_for_bean(&db, &bean.id).unwrap().unwrap().id,
            older_dialed.id
        );

        let newer_dialed = create_shot(&db, dialed).unwrap();
        let latest = create_shot(&db, new_shot(&bean.id)).unwrap();

        assert_eq!(
            get_last_shot_for_bean(&db, &bean.id).unwrap().unwrap().id,
            latest.id
        );
        assert_eq!(
            get_dialed_shot_for_bean(&db, &bean.id).unwrap().unwrap().id,
            newer_dialed.id
        );
    }

    #[test]
    fn test_dialed_shot_none_without_dialed_shots() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();
        create_shot(&db, new_shot(&bean.id)).unwrap();

        assert!(get_dialed_shot_for_bean(&db, &bean.id).unwrap().is_none());
    }

    #[test]
    fn test_count_shots_for_bean() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();
        assert_eq!(count_shots_for_bean(&db, &bean.id).unwrap(), 0);

        create_shot(&db, new_shot(&bean.id)).unwrap();
        create_shot(&db, new_shot(&bean.id)).unwrap();

        assert_eq!(count_shots_for_bean(&db, &bean.id).unwrap(), 2);
    }

    #[test]
    fn test_list_bean_summaries() {
        let db = open_in_memory().unwrap();
        let empty = create_bean(&db, new_bean("Empty")).unwrap();
        let busy = create_bean(&db, new_bean("Busy")).unwrap();
        create_shot(&db, new_shot(&busy.id)).unwrap();
        let mut dialed = new_shot(&busy.id);
        dialed.is_dialed = true;
        let dialed = create_shot(&db, dialed).unwrap();

        let summaries = list_bean_summaries(&db).unwrap();
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].bean.id, busy.id);
        assert_eq!(summaries[0].shot_count, 2);
        assert_eq!(summaries[0].dialed_shot.as_ref().map(|s| &s.id), Some(&dialed.id));

        assert_eq!(summaries[1].bean.id, empty.id);
        assert_eq!(summaries[1].shot_count, 0);
        assert!(summaries[1].dialed_shot.is_none());
    }

    #[test]
    fn test_timestamps_stored_fixed_width() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();

        let raw: String = db
            .lock()
            .query_row("SELECT createdAt FROM beans WHERE id = ?1", [&bean.id], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(raw.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(raw.ends_with('Z'));
    }

    #[test]
    fn test_nonzero_active_flag_counts_as_active() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Hand edited")).unwrap();
        db.lock()
            .execute("UPDATE beans SET isActive = 2 WHERE id = ?1", [&bean.id])
            .unwrap();

        let active = get_active_bean(&db).unwrap().unwrap();
        assert_eq!(active.id, bean.id);
        assert!(active.is_active);
    }

    #[test]
    fn test_nonzero_dialed_flag_counts_as_dialed() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Hand edited")).unwrap();
        let shot = create_shot(&db, new_shot(&bean.id)).unwrap();
        db.lock()
            .execute("UPDATE shots SET isDialed = 2 WHERE id = ?1", [&shot.id])
            .unwrap();

        let dialed = get_dialed_shot_for_bean(&db, &bean.id).unwrap().unwrap();
        assert_eq!(dialed.id, shot.id);
        assert!(dialed.is_dialed);
    }

    #[test]
    fn test_list_bean_summaries_picks_latest_dialed_shot() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();
        let mut dialed = new_shot(&bean.id);
        dialed.is_dialed = true;
        create_shot(&db, dialed.clone()).unwrap();
        let latest_dialed = create_shot(&db, dialed).unwrap();
        create_shot(&db, new_shot(&bean.id)).unwrap();

        let summaries = list_bean_summaries(&db).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].shot_count, 3);
        assert_eq!(summaries[0].dialed_shot.as_ref(), Some(&latest_dialed));
    }

    #[test]
    fn test_unparsable_created_at_is_a_read_error() {
        let db = open_in_memory().unwrap();
        let bean = create_bean(&db, new_bean("Geisha")).unwrap();
        db.lock()
            .execute("UPDATE beans SET createdAt = 'yesterday' WHERE id = ?1", [&bean.id])
            .unwrap();

        let err = get_bean(&db, &bean.id).unwrap_err();
        assert!(matches!(
            err,
            DbError::Sqlite(rusqlite::Error::FromSqlConversionFailure(6, Type::Text, _))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_at_most_one_active_bean(picks in prop::collection::vec(0usize..6, 1..24)) {
            let db = open_in_memory().unwrap();
            let ids: Vec<String> = (0..4)
                .map(|i| create_bean(&db, new_bean(&format!("Bean {i}"))).unwrap().id)
                .collect();

            let mut expected: Option<String> = None;
            for pick in picks {
                // Indexes past the end stand for ids that do not exist.
                let target = ids.get(pick).cloned().unwrap_or_else(|| format!("missing-{pick}"));
                let activated = set_active_bean(&db, &target).unwrap();
                if activated {
                    expected = Some(target);
                }

                let active = get_active_bean(&db).unwrap().map(|b| b.id);
                prop_assert!(active_count(&db) <= 1);
                prop_assert_eq!(active, expected.clone());
            }
        }
    }
}
