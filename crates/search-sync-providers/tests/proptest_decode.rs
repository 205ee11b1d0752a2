// crates/search-sync-providers/tests/proptest_decode.rs
// ============================================================================
// Module: Response Decoding Property Tests
// Description: Property checks for search analytics response decoding.
// Purpose: Ensure counts survive either JSON number form and junk never panics.
// Dependencies: search-sync-providers, proptest, serde_json
// ============================================================================

//! ## Overview
//! Counts arrive as JSON doubles; both `7` and `7.0` must decode to the same
//! whole number, and arbitrary bytes must produce an error rather than a panic.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions are permitted."
)]

use proptest::prelude::*;
use search_sync_providers::decode_rows;
use serde_json::json;

proptest! {
    #[test]
    fn whole_counts_decode_in_either_number_form(
        clicks in 0_u32 .. 1_000_000,
        impressions in 0_u32 .. 1_000_000,
        position in 1.0_f64 .. 200.0,
        as_double in any::<bool>(),
    ) {
        let clicks_value =
            if as_double { json!(f64::from(clicks)) } else { json!(clicks) };
        let body = json!({"rows": [{
            "keys": ["q", "https://example.com/", "usa", "DESKTOP"],
            "clicks": clicks_value,
            "impressions": impressions,
            "position": position,
        }]});
        let rows = decode_rows(body.to_string().as_bytes()).unwrap();
        prop_assert_eq!(rows.len(), 1);
        prop_assert_eq!(rows[0].clicks, u64::from(clicks));
        prop_assert_eq!(rows[0].impressions, u64::from(impressions));
        prop_assert!((rows[0].position - position).abs() < 1e-9);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0 .. 256)) {
        let _ = decode_rows(&bytes);
    }
}
