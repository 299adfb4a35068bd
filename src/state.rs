use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    mailer::Mailer,
    repository::{PgUserRepository, SeaOrmCartRepository, SeaOrmProductRepository},
};

/// Application context built once at startup and injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub users: PgUserRepository,
    pub products: SeaOrmProductRepository,
    pub cart: SeaOrmCartRepository,
    pub mailer: Mailer,
}

impl AppState {
    pub fn new(config: AppConfig, pool: DbPool, orm: OrmConn, mailer: Mailer) -> Self {
        Self {
            config,
            users: PgUserRepository::new(pool),
            products: SeaOrmProductRepository::new(orm.clone()),
            cart: SeaOrmCartRepository::new(orm),
            mailer,
        }
    }
}
