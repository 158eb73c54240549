#![no_main]

use libfuzzer_sys::fuzz_target;

use numkit_core::fibonacci::{fibonacci, fibonacci_with_cache, FibCache};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    // Two indices from the first 4 bytes, capped for speed
    let a = u64::from(u16::from_le_bytes([data[0], data[1]])) % 5_000;
    let b = u64::from(u16::from_le_bytes([data[2], data[3]])) % 5_000;

    // A cache warmed by one query must agree with a fresh computation
    let cache = FibCache::new();
    let _ = fibonacci_with_cache(a, &cache);
    let cached = fibonacci_with_cache(b, &cache);
    assert_eq!(cached, fibonacci(b), "cache disagreement at F({b}) after F({a})");

    if b >= 2 {
        let sum = fibonacci_with_cache(b - 1, &cache) + fibonacci_with_cache(b - 2, &cache);
        assert_eq!(cached, sum, "recurrence broken at F({b})");
    }
});
