use sluice::{BufferedPipeline, Error, Pipeline};
use tokio::time::timeout;

mod common;
use common::DEADLINE;

#[tokio::test]
async fn panicking_map_does_not_hang_the_consumer() {
    let res = timeout(
        DEADLINE,
        Pipeline::from_iter(1..=10)
            .map(|x: i32| {
                if x == 4 {
                    panic!("cannot handle 4");
                }
                x
            })
            .filter(|x| x % 2 == 1)
            .to_sequence(),
    )
    .await
    .expect("consumer hung after a stage panic");

    assert_eq!(
        res,
        Err(Error::StageFault {
            stage: "map",
            message: "cannot handle 4".to_string()
        })
    );
}

#[tokio::test]
async fn panicking_filter_in_buffered_pipeline() {
    let res = timeout(
        DEADLINE,
        BufferedPipeline::from_iter(0..1000, 16)
            .filter(|x: &i32| {
                assert!(*x < 500, "too large");
                true
            })
            .to_sequence(),
    )
    .await
    .expect("consumer hung after a stage panic");

    assert!(matches!(res, Err(Error::StageFault { stage: "filter", .. })));
}

#[tokio::test]
async fn for_each_sees_elements_before_the_fault() {
    let mut seen = Vec::new();

    let res = timeout(
        DEADLINE,
        Pipeline::from_iter(vec![1, 2, 3])
            .inspect(|x: &i32| {
                if *x == 3 {
                    panic!("boom");
                }
            })
            .for_each(|x| seen.push(x)),
    )
    .await
    .expect("consumer hung after a stage panic");

    assert!(matches!(res, Err(Error::StageFault { stage: "inspect", .. })));
    assert_eq!(seen, vec![1, 2]);
}

#[tokio::test]
async fn generator_error_is_propagated() {
    let res = Pipeline::from_generator(|sink| async move {
        sink.send(1).await?;
        Err(Error::generator("source went away"))
    })
    .to_sequence()
    .await;

    assert_eq!(res, Err(Error::Generator("source went away".to_string())));
}

#[tokio::test]
async fn generator_panic_closes_the_pipeline() {
    let res = timeout(
        DEADLINE,
        BufferedPipeline::from_generator(
            |sink| async move {
                sink.send("a").await?;
                panic!("generator exploded")
            },
            4,
        )
        .to_sequence(),
    )
    .await
    .expect("consumer hung after a generator panic");

    assert!(matches!(res, Err(Error::StageFault { stage: "generator", .. })));
}

#[tokio::test]
async fn build_reports_the_fault() {
    let (mut output, join) = Pipeline::from_iter(vec![1, 2])
        .map(|x: i32| -> i32 { panic!("no {x}") })
        .build();

    assert_eq!(output.recv().await, None);
    assert_eq!(
        join.await,
        Err(Error::StageFault {
            stage: "map",
            message: "no 1".to_string()
        })
    );
}
