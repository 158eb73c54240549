#![no_main]

use libfuzzer_sys::fuzz_target;

use numkit_core::integral::plan_chunks;

fuzz_target!(|data: &[u8]| {
    if data.len() < 17 {
        return;
    }
    let lower = f64::from_le_bytes(data[0..8].try_into().unwrap());
    let upper = f64::from_le_bytes(data[8..16].try_into().unwrap());
    let chunks = usize::from(data[16]);

    // Either rejected, or contiguous chunks covering [lower, upper]
    let Ok(plan) = plan_chunks(lower, upper, chunks) else {
        return;
    };
    let tolerance = (upper - lower).abs().max(lower.abs()).max(upper.abs()) * 1e-9;
    assert_eq!(plan.len(), chunks);
    assert_eq!(plan[0].lower.to_bits(), lower.to_bits());
    assert!((plan[chunks - 1].upper - upper).abs() <= tolerance);
    for (i, chunk) in plan.iter().enumerate() {
        assert_eq!(chunk.index, i);
        assert!(chunk.lower.is_finite() && chunk.upper.is_finite());
    }
    for pair in plan.windows(2) {
        assert!((pair[0].upper - pair[1].lower).abs() <= tolerance);
    }
});
