use sluice::{Pipeline, Pump, StageContext};
use tokio::{
    sync::mpsc::{self, Receiver},
    task::JoinHandle,
};

/// Emits the running fold after every input
pub struct ScanPump<Acc, F> {
    init: Acc,
    fold_fn: F,
}

impl<In, Acc, F> Pump<In, Acc> for ScanPump<Acc, F>
where
    F: FnMut(Acc, In) -> Acc + Send + 'static,
    In: Send + 'static,
    Acc: Send + Clone + 'static,
{
    fn spawn(
        mut self,
        mut input_receiver: Receiver<In>,
        ctx: StageContext,
    ) -> (Receiver<Acc>, JoinHandle<sluice::Result<()>>) {
        let (output_sender, output_receiver) = mpsc::channel(ctx.capacity.get());

        let h = tokio::spawn(async move {
            let mut acc = self.init;
            loop {
                let input = tokio::select! {
                    _ = ctx.cancel.cancelled() => break,
                    input = input_receiver.recv() => input,
                };
                let Some(input) = input else { break };

                acc = (self.fold_fn)(acc, input);
                if output_sender.send(acc.clone()).await.is_err() {
                    break;
                }
            }
            Ok(())
        });

        (output_receiver, h)
    }

    fn name(&self) -> &'static str {
        "scan"
    }
}

#[tokio::main]
async fn main() -> sluice::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let pipeline = Pipeline::from_iter(1..=10).map(|x| x - 1);

    let running = pipeline
        .pump(ScanPump {
            init: 0,
            fold_fn: |a: i32, b: i32| a + b,
        })
        .to_sequence()
        .await?;
    println!("running totals: {:?}", running.as_slice());

    let total = Pipeline::from_iter(1..=10)
        .map(|x| x - 1)
        .fold(0, |a: i32, b| a + b)
        .await?;
    println!("total: {total}");

    Ok(())
}
