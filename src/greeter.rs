//! Greeter actor
//!
//! The smallest request/reply exchange: a `Greet` carries the address to
//! answer, and the reply carries the greeter's own address back.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::address::{mailbox, Addr, Behavior, Mailbox};

/// Ask the greeter to greet `whom`
#[derive(Debug)]
pub struct Greet {
    pub whom: String,
    pub reply_to: Addr<Greeted>,
}

/// Reply to a `Greet`
#[derive(Debug)]
pub struct Greeted {
    pub whom: String,
    pub by: Addr<Greet>,
}

/// Actor answering every `Greet` with a `Greeted`
pub struct Greeter {
    myself: Addr<Greet>,
    receiver: Mailbox<Greet>,
    cancel_token: CancellationToken,
}

impl Greeter {
    /// Spawn a greeter that runs until `cancel_token` is cancelled
    pub fn spawn(cancel_token: CancellationToken) -> (Addr<Greet>, JoinHandle<()>) {
        let (myself, receiver) = mailbox();
        let greeter = Self {
            myself: myself.clone(),
            receiver,
            cancel_token,
        };
        (myself, tokio::spawn(greeter.run()))
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => break,
                greet = self.receiver.recv() => {
                    let Some(greet) = greet else { break };
                    if self.handle_greet(greet) == Behavior::Stopped {
                        break;
                    }
                }
            }
        }
    }

    fn handle_greet(&self, greet: Greet) -> Behavior {
        info!("Hello {}!", greet.whom);
        greet.reply_to.tell(Greeted {
            whom: greet.whom,
            by: self.myself.clone(),
        });
        Behavior::Same
    }
}
