//! RFC 1982 serial number arithmetic over 32-bit AMQP sequence numbers.
//!
//! Delivery counts wrap, so ordering has to be decided on the distance between
//! two values rather than their raw magnitude.

/// AMQP 1.0 sequence number (2.8.10).
pub type SequenceNo = u32;

const HALF_RANGE: u32 = 1 << 31;

/// Compares sequence numbers with wrapping arithmetic.
pub fn sequence_greater_than(s1: SequenceNo, s2: SequenceNo) -> bool {
    ((s1 > s2) && (s1 - s2 < HALF_RANGE)) || ((s1 < s2) && (s2 - s1 > HALF_RANGE))
}

/// Compares sequence numbers with wrapping arithmetic.
pub fn sequence_less_than(s1: SequenceNo, s2: SequenceNo) -> bool {
    sequence_greater_than(s2, s1)
}

/// Signed distance from `from` to `to`, taking wrap-around into account.
pub fn sequence_delta(to: SequenceNo, from: SequenceNo) -> i64 {
    i64::from(to.wrapping_sub(from) as i32)
}
