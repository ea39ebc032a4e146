//! Budget periods, the stretches of time between paydays that budgets are
//! planned around.

mod core;
mod create_endpoint;
mod new_period_page;
mod reset_endpoint;

pub use core::{
    Period, PeriodId, create_period, create_period_table, delete_periods_for_user,
    get_current_period,
};
pub use create_endpoint::{CreatePeriodState, create_period_endpoint};
pub use new_period_page::get_new_period_page;
pub use reset_endpoint::{ResetPeriodState, reset_period};
