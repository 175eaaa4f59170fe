//! Counters emitted by the client. Nothing is exported unless the binary
//! installs a `metrics` recorder.

pub const API_REQUESTS: &str = "fitbit_api_requests_total";
pub const TOKEN_REFRESHES: &str = "fitbit_token_refreshes_total";
pub const DAYS_RETRIEVED: &str = "fitbit_days_retrieved_total";

pub fn record_api_request(status: u16) {
    metrics::counter!(API_REQUESTS, "status" => status.to_string()).increment(1);
}

pub fn record_refresh(succeeded: bool) {
    let outcome = if succeeded { "ok" } else { "failed" };
    metrics::counter!(TOKEN_REFRESHES, "outcome" => outcome).increment(1);
}

pub fn record_day() {
    metrics::counter!(DAYS_RETRIEVED).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_noops_without_recorder() {
        record_api_request(200);
        record_refresh(true);
        record_refresh(false);
        record_day();
    }
}
