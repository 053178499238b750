use proptest::prelude::*;
use sluice::{Pipeline, Sequence};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
}

proptest! {
    #[test]
    fn chains_preserve_order(
        input in proptest::collection::vec(any::<i32>(), 0..256),
        modulo in 1i32..8,
        capacity in 0usize..16,
    ) {
        let expected: Vec<i64> = input
            .iter()
            .filter(|x| *x % modulo == 0)
            .map(|x| i64::from(*x) * 2)
            .collect();

        let output = runtime().block_on(async move {
            Pipeline::from_iter(input)
                .filter(move |x| *x % modulo == 0)
                .to_buffered(capacity)
                .map(|x| i64::from(x) * 2)
                .to_sequence()
                .await
        });

        prop_assert_eq!(output.unwrap().into_vec(), expected);
    }

    #[test]
    fn map_preserves_count(input in proptest::collection::vec(any::<u16>(), 0..256)) {
        let len = input.len();

        let output = runtime().block_on(async move {
            Pipeline::from_iter(input).map(|x| x.to_string()).to_sequence().await
        });

        prop_assert_eq!(output.unwrap().len(), len);
    }

    #[test]
    fn filter_count_matches_predicate(input in proptest::collection::vec(any::<u8>(), 0..256)) {
        let matching = input.iter().filter(|x| **x > 100).count();

        let output = runtime().block_on(async move {
            Sequence::from(input).to_buffered(3).filter(|x| *x > 100).to_sequence().await
        });

        prop_assert_eq!(output.unwrap().len(), matching);
    }

    #[test]
    fn conversion_round_trip(
        input in proptest::collection::vec(any::<i64>(), 0..256),
        first in 1usize..32,
        second in 1usize..32,
    ) {
        let expected = input.clone();

        let output = runtime().block_on(async move {
            Sequence::from(input)
                .to_buffered(first)
                .to_unbounded()
                .to_buffered(second)
                .to_sequence()
                .await
        });

        prop_assert_eq!(output.unwrap().into_vec(), expected);
    }
}
