// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Platform fee on gross earnings, in percent.
    pub platform_fee_percent: i64,
    /// Days an earning stays pending before it may be released.
    pub earnings_hold_days: i64,
    /// Minimum payout request, in minor currency units.
    pub min_payout_amount: i64,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        let platform_fee_percent = std::env::var("PLATFORM_FEE_PERCENT")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(15);

        let earnings_hold_days = std::env::var("EARNINGS_HOLD_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(7);

        let min_payout_amount = std::env::var("MIN_PAYOUT_AMOUNT")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(1000);

        Config {
            database_url,
            port,
            platform_fee_percent,
            earnings_hold_days,
            min_payout_amount,
        }
    }
}
