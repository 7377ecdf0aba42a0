use crate::{batch_count, SECONDS_PER_BATCH};

/// Human-readable duration: seconds below a minute, minutes below an hour,
/// hours and minutes beyond.
pub fn format_duration(total_secs: u64) -> String {
    if total_secs < 60 {
        format!("{total_secs} sec")
    } else if total_secs < 3600 {
        format!("{} min", total_secs.div_ceil(60))
    } else {
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        if minutes == 0 {
            format!("{hours} hr")
        } else {
            format!("{hours} hr {minutes} min")
        }
    }
}

pub fn format_speed(addresses_per_sec: u64) -> String {
    format!("{addresses_per_sec} addresses/sec")
}

/// Pre-upload estimate: a fixed cost per batch, not a measurement.
pub fn estimated_upload_time(valid_count: usize, batch_size: usize) -> String {
    let batches = batch_count(valid_count, batch_size) as u64;
    format_duration(batches * SECONDS_PER_BATCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_buckets() {
        assert_eq!(format_duration(0), "0 sec");
        assert_eq!(format_duration(59), "59 sec");
        assert_eq!(format_duration(60), "1 min");
        assert_eq!(format_duration(61), "2 min");
        assert_eq!(format_duration(3600), "1 hr");
        assert_eq!(format_duration(3600 + 5 * 60 + 30), "1 hr 5 min");
    }

    #[test]
    fn estimate_grows_with_batch_count() {
        assert_eq!(estimated_upload_time(0, 100), "0 sec");
        assert_eq!(estimated_upload_time(250, 100), "6 sec");
        assert_eq!(estimated_upload_time(100 * 60, 100), "2 min");
    }
}
