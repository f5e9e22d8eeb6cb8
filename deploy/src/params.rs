use alloy::primitives::{address, Address};
use chrono::{DateTime, Duration, Utc};

pub const TOKEN_NAME: &str = "AffynToken";
pub const TOKEN_SYMBOL: &str = "ATT";
pub const TOKEN_TOTAL_SUPPLY: &str = "1000000000000";

pub const SALE_HARD_CAP: &str = "2200000000000000000000000";
pub const SALE_INDIVIDUAL_CAP: &str = "500000000000000000000000";
pub const SALE_RATE: &str = "1";
pub const SALE_BENEFICIARY: Address = address!("DB580ea4595Efb66507926cAcb09f9a80F0A5148");
pub const SALE_CLIFF_DURATION: &str = "3600"; // 1 hour
pub const SALE_VESTING_DURATION: &str = "604800"; // 7 days
pub const SALE_RELEASE_INTERVAL: &str = "86400"; // 1 day

/// Delay between the deployment and the opening of the sale, in seconds.
pub const OPENING_DELAY_SECS: i64 = 60;
/// How long the sale stays open, in seconds.
pub const SALE_DURATION_SECS: i64 = 3600;

/// Opening and closing unix timestamps handed to the sale constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleSchedule {
    pub opening_time: i64,
    pub closing_time: i64,
}

impl SaleSchedule {
    /// Opens the sale one minute after `now` (rounded to the nearest second)
    /// and closes it one hour later.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        let opening_time = round_to_seconds(now) + OPENING_DELAY_SECS;
        SaleSchedule {
            opening_time,
            closing_time: opening_time + SALE_DURATION_SECS,
        }
    }

    pub fn opening(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.opening_time, 0)
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.closing_time - self.opening_time)
    }
}

fn round_to_seconds(now: DateTime<Utc>) -> i64 {
    let carry = if now.timestamp_subsec_millis() >= 500 { 1 } else { 0 };
    now.timestamp() + carry
}

pub fn token_args() -> Vec<String> {
    vec![
        TOKEN_NAME.to_string(),
        TOKEN_SYMBOL.to_string(),
        TOKEN_TOTAL_SUPPLY.to_string(),
    ]
}

/// Constructor arguments of the private sale, in declaration order.
pub fn sale_args(token: Address, schedule: &SaleSchedule) -> Vec<String> {
    vec![
        token.to_string(),
        SALE_HARD_CAP.to_string(),
        SALE_INDIVIDUAL_CAP.to_string(),
        schedule.opening_time.to_string(),
        schedule.closing_time.to_string(),
        SALE_BENEFICIARY.to_string(),
        SALE_RATE.to_string(),
        SALE_CLIFF_DURATION.to_string(),
        SALE_VESTING_DURATION.to_string(),
        SALE_RELEASE_INTERVAL.to_string(),
    ]
}
