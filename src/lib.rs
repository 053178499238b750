//! Channel-backed pipelines for Rust. A sluice lets water through at the rate you set.
//!
//! This crate offers three interchangeable sequence types:
//!
//! - [`Sequence`] - an eager, in-memory sequence
//! - [`Pipeline`] - a concurrent pipeline whose stages hand elements off one at a time
//! - [`BufferedPipeline`] - a concurrent pipeline whose stages may run ahead of their consumer
//!   up to a fixed capacity (backpressure)
//!
//! All three support `map`, `filter`, `for_each` and `fold`, and each converts into the others.
//!
//! Main features:
//!
//! - One Tokio task per stage, connected by bounded channels
//! - Strict FIFO ordering end to end
//! - Explicit, bounded memory use in [`BufferedPipeline`]
//! - Panicking stages are reported instead of stalling the consumer
//! - Cancellation of a whole chain through a shared token
//!
//! Example:
//!
//! ```rust
//! use sluice::{Pipeline, Sequence};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let output = Sequence::from(vec![1, 2, 3, 4])
//!     .to_pipeline()
//!     .filter(|x| x % 2 == 0)
//!     .to_buffered(16)
//!     .map(|x| x * 2)
//!     .to_sequence()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(output.into_vec(), vec![4, 8]);
//! # });
//! ```
//!
//! ## Stages
//!
//! A stage is a wrapper around a common async programming pattern - work is split into several
//! tasks that communicate with each other using channels
//!
//! ```rust, ignore
//! let (sender0, mut receiver0) = mpsc::channel(1);
//! let (sender1, mut receiver1) = mpsc::channel(1);
//!
//! tokio::spawn(async move {
//!     while let Some(x) = receiver0.recv().await {
//!         sender1.send(work(x)).await.unwrap();
//!     }
//! });
//!
//! // send data to input channel
//! send_input(sender0).await;
//!
//! while let Some(output) = receiver1.recv().await {
//!     println!("done with {}", output);
//! }
//! ```
//!
//! Every operation spawns one such task reading the previous stage's channel and writing its own.
//! A stage stops when its input closes, when its output is dropped, or when the pipeline is
//! cancelled. Dropping its sender is what closes the channel for the next stage.
//!
//! ### Creation
//!
//! ```rust
//! use sluice::{BufferedPipeline, Pipeline, Sequence};
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // from a sequence
//! let pipeline = Sequence::from(vec![1, 2, 3]).to_pipeline();
//!
//! // from a generator, buffering up to 8 elements
//! let pipeline = BufferedPipeline::from_generator(|sink| async move {
//!     sink.send(1).await?;
//!     sink.send(2).await
//! }, 8);
//!
//! // from a channel
//! let (sender, receiver) = tokio::sync::mpsc::channel::<u32>(100);
//! let pipeline = Pipeline::from(receiver);
//!
//! // from a stream
//! let pipeline = Pipeline::from_stream(futures::stream::iter(vec![1, 2, 3]));
//! # });
//! ```
//!
//! ### Backpressure
//!
//! Backpressure defines the amount of unconsumed data that can accumulate in memory. A
//! [`Pipeline`] uses hand-off channels, every producer waits for its consumer after each element.
//! A [`BufferedPipeline`] of capacity `n` lets every stage produce up to `n` elements before it
//! waits, smoothing bursty producers at the cost of `n` buffered elements per stage.
//!
//! ### Changing element types
//!
//! `map` is generic over its output type, so a pipeline changes its element type statically. To
//! mix element types in a single pipeline, [`Pipeline::erase`] (or a `map` returning [`Dynamic`])
//! boxes the elements, and [`Pipeline::recast`] or [`Pipeline::try_recast`] narrow them back.
//!
//! ### Panic handling
//! A panic in a stage terminates that stage's task. Its channels close, so neighbouring stages
//! stop and the consumer is never left waiting. The terminal operation returns
//! [`Error::StageFault`].
//!
//! ### Custom stages
//! Custom stages can be created by implementing the [`Pump`] trait, and using the `.pump()`
//! method. For example:
//!
//! ```rust
//! use sluice::{Pipeline, Pump, StageContext};
//! use tokio::{sync::mpsc::{self, Receiver}, task::JoinHandle};
//!
//! pub struct DuplicatePump;
//! impl<In> Pump<In, In> for DuplicatePump
//! where
//!     In: Send + Clone + 'static,
//! {
//!     fn spawn(
//!         self,
//!         mut input_receiver: Receiver<In>,
//!         ctx: StageContext,
//!     ) -> (Receiver<In>, JoinHandle<sluice::Result<()>>) {
//!         let (output_sender, output_receiver) = mpsc::channel(ctx.capacity.get());
//!
//!         let h = tokio::spawn(async move {
//!             while let Some(input) = input_receiver.recv().await {
//!                 if output_sender.send(input.clone()).await.is_err()
//!                     || output_sender.send(input).await.is_err()
//!                 {
//!                     break;
//!                 }
//!             }
//!             Ok(())
//!         });
//!
//!         (output_receiver, h)
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let output = Pipeline::from_iter(vec![1, 2])
//!     .pump(DuplicatePump)
//!     .to_sequence()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(output.into_vec(), vec![1, 1, 2, 2]);
//! # });
//! ```
mod buffered;
mod capacity;
mod chain;
mod error;
mod pipeline;
mod pumps;
mod sequence;
mod sink;
mod stages;

#[cfg(test)]
mod test_utils;

pub use buffered::BufferedPipeline;
pub use capacity::Capacity;
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use pumps::pump::{Pump, StageContext};
pub use pumps::recast::Dynamic;
pub use sequence::Sequence;
pub use sink::Sink;
