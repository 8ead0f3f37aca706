use chrono::Local;

/// Persisted date format, `YYYY-MM-DD`.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persisted timestamp format, `YYYY-MM-DDTHH:MM:SS`.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) fn today_stamp() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

pub(crate) fn now_stamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
