/*
 * Responsibility
 * - station の slot grid 計算 (pure、I/O なし)
 * - grid の起点は `now` を slot 長の倍数に切り下げた時刻
 *   (呼び出しごとに slot 時刻がぶれず、保存済み booking と完全一致する)
 */
use chrono::{DateTime, Duration, Utc};

use crate::repos::station_repo::StationSettings;

fn step_seconds(settings: StationSettings) -> i64 {
    i64::from(settings.duration_minutes.max(1)) * 60
}

/// First slot of the grid at `now`.
pub fn grid_start(settings: StationSettings, now: DateTime<Utc>) -> DateTime<Utc> {
    let step = step_seconds(settings);
    let ts = now.timestamp();
    let aligned = ts - ts.rem_euclid(step);
    DateTime::<Utc>::from_timestamp(aligned, 0).unwrap_or(now)
}

/// All `max_slots` slot instants starting at the current grid start.
pub fn grid(settings: StationSettings, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let start = grid_start(settings, now);
    let step = step_seconds(settings);
    (0..settings.max_slots.max(0))
        .map(|i| start + Duration::seconds(step * i64::from(i)))
        .collect()
}

/// Grid slots without a `booked` booking.
pub fn available_slots(
    settings: StationSettings,
    booked: &[DateTime<Utc>],
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    grid(settings, now)
        .into_iter()
        .filter(|slot| !booked.contains(slot))
        .collect()
}

/// True when `slot` sits exactly on the station's grid (whole seconds, multiple of the duration).
pub fn is_on_grid(settings: StationSettings, slot: DateTime<Utc>) -> bool {
    slot.timestamp_subsec_nanos() == 0 && slot.timestamp().rem_euclid(step_seconds(settings)) == 0
}
