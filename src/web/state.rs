use crate::{
    Config,
    model::ModelManager,
    payments::CashfreeClient,
    web::middlewares::{IpRateLimiter, REQUESTS_PER_WINDOW},
};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    config: &'static Config,
    cashfree: CashfreeClient,
    rate_limiter: IpRateLimiter,
}

impl AppState {
    pub fn new(mm: ModelManager, config: &'static Config) -> Self {
        Self {
            mm,
            config,
            cashfree: CashfreeClient::new(config.cashfree()),
            rate_limiter: IpRateLimiter::per_minute(REQUESTS_PER_WINDOW),
        }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn config(&self) -> &'static Config {
        self.config
    }

    pub fn cashfree(&self) -> &CashfreeClient {
        &self.cashfree
    }

    pub fn rate_limiter(&self) -> &IpRateLimiter {
        &self.rate_limiter
    }
}
