#![no_main]

use libfuzzer_sys::fuzz_target;

use numkit_core::stats::{two_sum, Summary};

fuzz_target!(|data: &[u8]| {
    let values: Vec<i64> = data
        .chunks_exact(8)
        .map(|c| i64::from_le_bytes(c.try_into().unwrap()))
        .collect();
    let Some((&target, values)) = values.split_first() else {
        return;
    };

    if let Some((i, j)) = two_sum(values, target) {
        assert!(i < j && j < values.len());
        assert_eq!(values[i].checked_add(values[j]), Some(target));
    }

    #[allow(clippy::cast_precision_loss)]
    let floats: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    let summary = Summary::from_values(&floats);
    assert_eq!(summary.count, floats.len());
});
