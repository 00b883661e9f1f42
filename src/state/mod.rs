// State management module
// Handles SQLite persistence: schema, migrations and typed queries

pub mod codec;
pub mod db;
pub mod models;
pub mod queries;
pub mod storage;

pub use db::{init_db, initialize, open_db, open_in_memory, DbConnection, DbError, DbResult};
pub use models::{
    Bean, BeanSummary, BeanUpdate, BrewMethod, DrinkType, NewBean, NewShot, Shot,
    ShotCharacteristic, ShotUpdate, ShotWithBean, TasteTag,
};
pub use queries::{
    count_shots_for_bean, create_bean, create_shot, delete_bean, delete_shot, get_active_bean,
    get_bean, get_dialed_shot_for_bean, get_last_shot_for_bean, get_shot, list_bean_summaries,
    list_beans, list_shots, set_active_bean, update_bean, update_shot,
};
