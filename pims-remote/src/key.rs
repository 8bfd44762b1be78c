use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Lexicographically ordered alphabet, so keys generated later sort after earlier ones.
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// A fresh 20 character key: 8 characters of millisecond timestamp followed by 12 random
/// characters (72 bits).
#[must_use]
pub fn push_key(rng: &mut impl Rng) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_millis());
    push_key_at(millis, rng)
}

pub(crate) fn push_key_at(mut millis: u128, rng: &mut impl Rng) -> String {
    let mut time = [0_u8; 8];
    for slot in time.iter_mut().rev() {
        *slot = PUSH_CHARS[(millis % 64) as usize];
        millis /= 64;
    }
    let mut key = String::with_capacity(20);
    key.extend(time.iter().map(|&byte| char::from(byte)));
    key.extend((0..12).map(|_| char::from(PUSH_CHARS[rng.gen_range(0..64)])));
    key
}
