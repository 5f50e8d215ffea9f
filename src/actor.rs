//! Actors receive events over an unbounded channel. Each event travels with
//! the span that was current when it was sent, so the handler's logs nest
//! under whatever produced the event.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{Span, trace};

pub mod menu;
pub mod reactor;

pub struct Sender<Event>(UnboundedSender<(Span, Event)>);
pub type Receiver<Event> = UnboundedReceiver<(Span, Event)>;

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = unbounded_channel();
    (Sender(tx), rx)
}

impl<Event> Sender<Event> {
    /// Queues `event`. Returns false if the receiving actor has stopped, in
    /// which case the event is dropped.
    pub fn send(&self, event: Event) -> bool {
        let delivered = self.0.send((Span::current(), event)).is_ok();
        if !delivered {
            trace!("receiver closed, event dropped");
        }
        delivered
    }

    pub fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}
