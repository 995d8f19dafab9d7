/*
 * Responsibility
 *  - 公開 ID で指すリソースごとの「意味付きID型」
 *  - decode ロジックは置かない (core 側)
 */
use super::core::PublicId;

// stations
pub enum StationTag {}
pub type PublicStationId = PublicId<StationTag>;

// bookings
pub enum BookingTag {}
pub type PublicBookingId = PublicId<BookingTag>;
