// Application state shared across handlers

use std::sync::Arc;

use crate::db::DieselPool;
use crate::services::{EmailSender, JwtService, LifecycleService, Notifier, SmsSender};

#[derive(Clone)]
pub struct AppState {
    pub diesel_pool: DieselPool,
    pub jwt_service: Arc<JwtService>,
    pub lifecycle: Arc<LifecycleService>,
    pub notifier: Arc<Notifier>,
    pub email_sender: Arc<EmailSender>,
    pub sms_sender: Arc<SmsSender>,
}

impl AppState {
    pub fn new(diesel_pool: DieselPool) -> Self {
        Self {
            jwt_service: Arc::new(JwtService::from_config()),
            lifecycle: Arc::new(LifecycleService::new(diesel_pool.clone())),
            notifier: Arc::new(Notifier::new(diesel_pool.clone())),
            email_sender: Arc::new(EmailSender::from_config()),
            sms_sender: Arc::new(SmsSender::from_config()),
            diesel_pool,
        }
    }
}
