use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, EmailService, Notifier, ReservationService, SeaOrmAuthService,
    SeaOrmReservationService, SlackService,
};

/// Everything the handlers share, built once from an explicit [`Config`].
/// Services receive their configuration by value at construction; nothing
/// below this point reads the process environment.
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,

    pub reservations: Arc<dyn ReservationService>,

    pub notifier: Arc<Notifier>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let email = Arc::new(EmailService::new(config.smtp.clone()));
        let slack = Arc::new(SlackService::new(config.slack.clone()));

        let notifier = Arc::new(Notifier::new(
            email,
            slack,
            config.general.notify_buffer_size,
        ));
        notifier.start_outcome_logger();

        let auth = Arc::new(SeaOrmAuthService::new(store.clone(), notifier.clone()))
            as Arc<dyn AuthService>;

        let reservations = Arc::new(SeaOrmReservationService::new(
            store.clone(),
            notifier.clone(),
        )) as Arc<dyn ReservationService>;

        Ok(Self {
            config,
            store,
            auth,
            reservations,
            notifier,
        })
    }
}
