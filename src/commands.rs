// Async commands consumed by the UI shell
//
// Every command runs its query on the blocking pool against the shared
// connection handle, so callers can await storage without stalling the runtime.
use crate::dial::ShotDefaults;
use crate::state::{
    self, Bean, BeanSummary, BeanUpdate, DbConnection, DbResult, NewBean, NewShot, Shot,
    ShotUpdate, ShotWithBean,
};

async fn run_blocking<T, F>(db: &DbConnection, job: F) -> DbResult<T>
where
    F: FnOnce(&DbConnection) -> DbResult<T> + Send + 'static,
    T: Send + 'static,
{
    let db = db.clone();
    tokio::task::spawn_blocking(move || job(&db)).await?
}

// ==================== BEAN COMMANDS ====================

pub async fn create_bean(db: &DbConnection, input: NewBean) -> DbResult<Bean> {
    let bean = run_blocking(db, move |db| state::create_bean(db, input)).await?;
    log::info!("Created bean {} ({} / {})", bean.id, bean.name, bean.roaster);
    Ok(bean)
}

pub async fn update_bean(db: &DbConnection, id: &str, update: BeanUpdate) -> DbResult<()> {
    let id = id.to_string();
    run_blocking(db, move |db| state::update_bean(db, &id, update)).await
}

pub async fn delete_bean(db: &DbConnection, id: &str) -> DbResult<()> {
    let id = id.to_string();
    run_blocking(db, move |db| state::delete_bean(db, &id)).await
}

pub async fn list_beans(db: &DbConnection) -> DbResult<Vec<Bean>> {
    run_blocking(db, state::list_beans).await
}

pub async fn get_bean(db: &DbConnection, id: &str) -> DbResult<Option<Bean>> {
    let id = id.to_string();
    run_blocking(db, move |db| state::get_bean(db, &id)).await
}

pub async fn set_active_bean(db: &DbConnection, id: &str) -> DbResult<bool> {
    let id = id.to_string();
    run_blocking(db, move |db| state::set_active_bean(db, &id)).await
}

pub async fn get_active_bean(db: &DbConnection) -> DbResult<Option<Bean>> {
    run_blocking(db, state::get_active_bean).await
}

pub async fn list_bean_summaries(db: &DbConnection) -> DbResult<Vec<BeanSummary>> {
    run_blocking(db, state::list_bean_summaries).await
}

// ==================== SHOT COMMANDS ====================

pub async fn create_shot(db: &DbConnection, input: NewShot) -> DbResult<Shot> {
    let shot = run_blocking(db, move |db| state::create_shot(db, input)).await?;
    log::debug!(
        "Created shot {} for bean {} (dialed: {})",
        shot.id,
        shot.bean_id,
        shot.is_dialed
    );
    Ok(shot)
}

pub async fn update_shot(db: &DbConnection, id: &str, update: ShotUpdate) -> DbResult<()> {
    let id = id.to_string();
    run_blocking(db, move |db| state::update_shot(db, &id, update)).await
}

pub async fn delete_shot(db: &DbConnection, id: &str) -> DbResult<()> {
    let id = id.to_string();
    run_blocking(db, move |db| state::delete_shot(db, &id)).await
}

pub async fn list_shots(db: &DbConnection, bean_id: Option<&str>) -> DbResult<Vec<ShotWithBean>> {
    let bean_id = bean_id.map(str::to_string);
    run_blocking(db, move |db| state::list_shots(db, bean_id.as_deref())).await
}

pub async fn get_shot(db: &DbConnection, id: &str) -> DbResult<Option<ShotWithBean>> {
    let id = id.to_string();
    run_blocking(db, move |db| state::get_shot(db, &id)).await
}

pub async fn get_last_shot_for_bean(db: &DbConnection, bean_id: &str) -> DbResult<Option<Shot>> {
    let bean_id = bean_id.to_string();
    run_blocking(db, move |db| state::get_last_shot_for_bean(db, &bean_id)).await
}

pub async fn get_dialed_shot_for_bean(db: &DbConnection, bean_id: &str) -> DbResult<Option<Shot>> {
    let bean_id = bean_id.to_string();
    run_blocking(db, move |db| state::get_dialed_shot_for_bean(db, &bean_id)).await
}

pub async fn count_shots_for_bean(db: &DbConnection, bean_id: &str) -> DbResult<i64> {
    let bean_id = bean_id.to_string();
    run_blocking(db, move |db| state::count_shots_for_bean(db, &bean_id)).await
}

/// Starting parameters for the next shot of a bean
pub async fn shot_defaults_for_bean(db: &DbConnection, bean_id: &str) -> DbResult<ShotDefaults> {
    let last = get_last_shot_for_bean(db, bean_id).await?;
    Ok(ShotDefaults::from_last_shot(last.as_ref()))
}
