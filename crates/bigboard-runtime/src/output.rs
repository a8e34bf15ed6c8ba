//! Output collaborators
//!
//! The board hands each flushed line to an `Emit` implementation, one call
//! per message, in queue order.

use tokio::sync::mpsc;

/// Receives formatted board lines
pub trait Emit: Send {
    fn emit(&mut self, line: &str);
}

/// Prints each line to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutEmitter;

impl Emit for StdoutEmitter {
    fn emit(&mut self, line: &str) {
        println!("{line}");
    }
}

/// Forwards each line into a channel
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelEmitter {
    /// Create an emitter and the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelEmitter { tx }, rx)
    }
}

impl Emit for ChannelEmitter {
    fn emit(&mut self, line: &str) {
        if self.tx.send(line.to_string()).is_err() {
            tracing::debug!("output receiver dropped");
        }
    }
}

impl<E: Emit + ?Sized> Emit for Box<E> {
    fn emit(&mut self, line: &str) {
        (**self).emit(line)
    }
}
