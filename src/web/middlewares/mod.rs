mod auth;
pub use auth::{bearer_token, extract_context_fn, require_admin_fn, require_user_fn};

mod plan;
pub use plan::{check_plan, require_active_plan_fn};

mod rate_limit;
pub use rate_limit::{
    IpRateLimiter, REQUESTS_PER_WINDOW, RateDecision, WINDOW, client_ip, rate_limit_fn,
};
