use std::time::Duration;

use sluice::BufferedPipeline;

// A fast generator feeding a slow consumer. With RUST_LOG=sluice=trace the generator can be seen
// running at most `capacity` elements ahead.
#[tokio::main]
async fn main() -> sluice::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let capacity = 3;
    let pipeline = BufferedPipeline::from_generator(
        |sink| async move {
            for x in 0..12 {
                sink.send(x).await?;
                println!("produced {x}");
            }
            Ok(())
        },
        capacity,
    )
    .map(|x| x * x);

    let (mut output_receiver, join) = pipeline.build();

    while let Some(output) = output_receiver.recv().await {
        tokio::time::sleep(Duration::from_millis(100)).await;
        println!("consumed {output}");
    }

    join.await
}
