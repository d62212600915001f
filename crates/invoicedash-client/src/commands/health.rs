use chrono::{SecondsFormat, Utc};

use crate::ClientResult;
use crate::contracts::envelope::{SuccessEnvelope, endpoint};
use crate::contracts::types::HealthData;

pub fn run() -> ClientResult<SuccessEnvelope> {
    endpoint(
        "health",
        HealthData {
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    )
}
