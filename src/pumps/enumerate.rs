use tokio::{sync::mpsc::Receiver, task::JoinHandle};

use super::pump::{spawn_stage, Pump, StageContext, Step};
use crate::Result;

pub struct EnumeratePump;

impl<In> Pump<In, (usize, In)> for EnumeratePump
where
    In: Send + 'static,
{
    fn spawn(
        self,
        input_receiver: Receiver<In>,
        ctx: StageContext,
    ) -> (Receiver<(usize, In)>, JoinHandle<Result<()>>) {
        let name = Pump::<In, (usize, In)>::name(&self);
        let mut i = 0;

        spawn_stage(name, input_receiver, ctx, move |input| {
            let step = Step::Emit((i, input));
            i += 1;
            step
        })
    }

    fn name(&self) -> &'static str {
        "enumerate"
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use crate::Pipeline;

    #[tokio::test]
    async fn enumerate_works() {
        let (input_sender, input_receiver) = mpsc::channel(100);

        let (mut output_receiver, join_handle) = Pipeline::from(input_receiver).enumerate().build();

        input_sender.send(1).await.unwrap();
        input_sender.send(2).await.unwrap();
        input_sender.send(3).await.unwrap();

        assert_eq!(output_receiver.recv().await, Some((0, 1)));
        assert_eq!(output_receiver.recv().await, Some((1, 2)));
        assert_eq!(output_receiver.recv().await, Some((2, 3)));

        drop(input_sender);
        join_handle.await.unwrap();
    }

    #[tokio::test]
    async fn enumerate_counts_arrivals_after_filter() {
        let output = Pipeline::from_iter(vec!['a', 'b', 'c', 'd'])
            .filter(|c| *c != 'b')
            .enumerate()
            .to_sequence()
            .await
            .unwrap();

        assert_eq!(output.into_vec(), vec![(0, 'a'), (1, 'c'), (2, 'd')]);
    }
}
