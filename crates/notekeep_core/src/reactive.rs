//! Stream composition helpers for live queries.
//!
//! # Responsibility
//! - Combine independent live queries into one derived view input.
//!
//! # Invariants
//! - Nothing is emitted until every input has produced at least once.
//! - After that, any single input emission recomputes from the latest value
//!   of every input; inputs are never waited on in lockstep.
//! - The first error from any input is yielded and ends the combined stream.

use async_stream::stream;
use futures::{Stream, StreamExt};

/// Three latest-value slots.
#[derive(Debug, Clone)]
pub struct LatestSlots3<A, B, C> {
    a: Option<A>,
    b: Option<B>,
    c: Option<C>,
}

impl<A, B, C> Default for LatestSlots3<A, B, C> {
    fn default() -> Self {
        Self {
            a: None,
            b: None,
            c: None,
        }
    }
}

impl<A: Clone, B: Clone, C: Clone> LatestSlots3<A, B, C> {
    pub fn set_a(&mut self, value: A) -> Option<(A, B, C)> {
        self.a = Some(value);
        self.joined()
    }

    pub fn set_b(&mut self, value: B) -> Option<(A, B, C)> {
        self.b = Some(value);
        self.joined()
    }

    pub fn set_c(&mut self, value: C) -> Option<(A, B, C)> {
        self.c = Some(value);
        self.joined()
    }

    /// Current tuple, once every slot has been filled.
    pub fn joined(&self) -> Option<(A, B, C)> {
        match (&self.a, &self.b, &self.c) {
            (Some(a), Some(b), Some(c)) => Some((a.clone(), b.clone(), c.clone())),
            _ => None,
        }
    }
}

enum Emission<A, B, C, E> {
    A(A),
    B(B),
    C(C),
    Failed(E),
    Ended(Input),
    Exhausted,
}

#[derive(Clone, Copy)]
enum Input {
    A,
    B,
    C,
}

/// Combine-latest over three fallible streams.
///
/// Ends when every input has ended, or right after the first error.
pub fn combine_latest3<A, B, C, E, SA, SB, SC>(
    a: SA,
    b: SB,
    c: SC,
) -> impl Stream<Item = Result<(A, B, C), E>> + Send + 'static
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    E: Send + 'static,
    SA: Stream<Item = Result<A, E>> + Send + 'static,
    SB: Stream<Item = Result<B, E>> + Send + 'static,
    SC: Stream<Item = Result<C, E>> + Send + 'static,
{
    stream! {
        let mut a = Box::pin(a);
        let mut b = Box::pin(b);
        let mut c = Box::pin(c);
        let (mut a_open, mut b_open, mut c_open) = (true, true, true);
        let mut slots = LatestSlots3::default();

        loop {
            let emission = tokio::select! {
                item = a.next(), if a_open => match item {
                    Some(Ok(value)) => Emission::A(value),
                    Some(Err(err)) => Emission::Failed(err),
                    None => Emission::Ended(Input::A),
                },
                item = b.next(), if b_open => match item {
                    Some(Ok(value)) => Emission::B(value),
                    Some(Err(err)) => Emission::Failed(err),
                    None => Emission::Ended(Input::B),
                },
                item = c.next(), if c_open => match item {
                    Some(Ok(value)) => Emission::C(value),
                    Some(Err(err)) => Emission::Failed(err),
                    None => Emission::Ended(Input::C),
                },
                else => Emission::Exhausted,
            };

            let joined = match emission {
                Emission::A(value) => slots.set_a(value),
                Emission::B(value) => slots.set_b(value),
                Emission::C(value) => slots.set_c(value),
                Emission::Failed(err) => {
                    yield Err(err);
                    break;
                }
                Emission::Ended(input) => {
                    match input {
                        Input::A => a_open = false,
                        Input::B => b_open = false,
                        Input::C => c_open = false,
                    }
                    None
                }
                Emission::Exhausted => break,
            };

            if let Some(tuple) = joined {
                yield Ok(tuple);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{combine_latest3, LatestSlots3};
    use futures::stream::{self, StreamExt};
    use tokio::sync::mpsc;

    fn receiver_stream<T: Send + 'static>(
        mut rx: mpsc::UnboundedReceiver<T>,
    ) -> impl futures::Stream<Item = T> + Send + 'static {
        async_stream::stream! {
            while let Some(item) = rx.recv().await {
                yield item;
            }
        }
    }

    #[test]
    fn slots_emit_only_after_all_filled_then_on_every_update() {
        let mut slots: LatestSlots3<i32, &str, u64> = LatestSlots3::default();
        assert_eq!(slots.set_a(1), None);
        assert_eq!(slots.set_c(7), None);
        assert_eq!(slots.set_b("x"), Some((1, "x", 7)));
        assert_eq!(slots.set_a(2), Some((2, "x", 7)));
        assert_eq!(slots.set_c(8), Some((2, "x", 8)));
    }

    #[tokio::test]
    async fn recomputes_from_latest_values_on_single_input_emission() {
        let (tx_a, rx_a) = mpsc::unbounded_channel::<Result<i32, String>>();
        let (tx_b, rx_b) = mpsc::unbounded_channel::<Result<i32, String>>();
        let (tx_c, rx_c) = mpsc::unbounded_channel::<Result<i32, String>>();
        let combined = combine_latest3(
            receiver_stream(rx_a),
            receiver_stream(rx_b),
            receiver_stream(rx_c),
        );
        let mut combined = Box::pin(combined);

        tx_a.send(Ok(1)).unwrap();
        tx_b.send(Ok(10)).unwrap();
        tx_c.send(Ok(100)).unwrap();
        assert_eq!(combined.next().await, Some(Ok((1, 10, 100))));

        tx_b.send(Ok(20)).unwrap();
        assert_eq!(combined.next().await, Some(Ok((1, 20, 100))));

        drop(tx_a);
        tx_c.send(Ok(300)).unwrap();
        assert_eq!(combined.next().await, Some(Ok((1, 20, 300))));

        drop(tx_b);
        drop(tx_c);
        assert_eq!(combined.next().await, None);
    }

    #[tokio::test]
    async fn first_error_is_yielded_and_ends_the_stream() {
        let a = stream::iter(vec![Ok::<i32, String>(1)]);
        let b = stream::iter(vec![Err::<i32, String>("boom".to_string())]);
        let c = stream::pending::<Result<i32, String>>();
        let items: Vec<_> = combine_latest3(a, b, c).collect().await;
        assert_eq!(items, vec![Err("boom".to_string())]);
    }

    #[tokio::test]
    async fn ends_without_output_when_an_input_never_emits() {
        let a = stream::iter(vec![Ok::<i32, String>(1)]);
        let b = stream::iter(Vec::<Result<i32, String>>::new());
        let c = stream::iter(vec![Ok::<i32, String>(3)]);
        let items: Vec<_> = combine_latest3(a, b, c).collect().await;
        assert!(items.is_empty());
    }
}
