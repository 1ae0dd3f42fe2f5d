use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use sqlx::pool::PoolOptions;
use sqlx::MySqlPool;
use tokio::sync::watch;

use crate::auth::Authorization;
use crate::config::Config;
use crate::store::users::UserStore;
use crate::store::Store;
use crate::Error;

#[derive(Clone, Debug)]
pub struct State(Arc<StateInner>);

impl State {
    pub async fn new(config: Config, shutdown_rx: watch::Receiver<bool>) -> Result<Self, Error> {
        let pool: MySqlPool = PoolOptions::new()
            .max_connections(8)
            .max_lifetime(Duration::new(3600, 0))
            .idle_timeout(Duration::new(60, 0))
            .connect_lazy(&config.database.connect_string())?;

        let store = Store {
            pool,
            table_prefix: config.database.prefix.clone(),
        };

        let auth = Authorization::new(config.authorization.alg);

        let users = UserStore::open(&config.users).await?;

        Ok(Self(Arc::new(StateInner {
            store,
            users,
            auth,
            config,
            shutdown_rx,
        })))
    }
}

impl Deref for State {
    type Target = StateInner;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug)]
pub struct StateInner {
    pub store: Store,
    pub users: UserStore,
    pub auth: Authorization,
    pub config: Config,
    pub shutdown_rx: watch::Receiver<bool>,
}
