//! Ordered subscriber table with per-callback failure isolation.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use crate::event::{Event, EventKind, Topic};
use crate::manager::Context;

/// What a subscriber returns. An `Err` is logged and ignored.
pub type CallbackResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A boxed subscriber callback.
pub type Callback = Box<dyn FnMut(&Event, &Context<'_>) -> CallbackResult>;

/// Identifies a registration for [`Manager::unsubscribe`](crate::Manager::unsubscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Registration {
    id: SubscriptionId,
    callback: Callback,
}

/// Maps each event kind, plus a wildcard bucket, to callbacks in
/// registration order.
#[derive(Default)]
pub(crate) struct Subscribers {
    by_kind: HashMap<EventKind, Vec<Registration>>,
    wildcard: Vec<Registration>,
    next_id: u64,
}

impl Subscribers {
    pub fn add(&mut self, topic: Topic, callback: Callback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        let registration = Registration { id, callback };
        match topic {
            Topic::Kind(kind) => self.by_kind.entry(kind).or_default().push(registration),
            Topic::All => self.wildcard.push(registration),
        }
        id
    }

    /// Returns `true` if the registration existed.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let buckets = self
            .by_kind
            .values_mut()
            .chain(std::iter::once(&mut self.wildcard));
        for bucket in buckets {
            if let Some(pos) = bucket.iter().position(|r| r.id == id) {
                bucket.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum::<usize>() + self.wildcard.len()
    }

    /// Invokes specific-kind subscribers, then wildcard subscribers.
    ///
    /// A subscriber that returns `Err` or panics is logged and skipped;
    /// it stays registered. Returns the number of failed callbacks.
    pub fn dispatch(&mut self, event: &Event, ctx: &Context<'_>) -> usize {
        let specific = self.by_kind.get_mut(&event.kind).into_iter().flatten();
        let mut failures = 0;
        for registration in specific.chain(self.wildcard.iter_mut()) {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                (registration.callback)(event, ctx)
            }));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };
            failures += 1;
            tracing::error!(
                "subscriber {:?} failed on {event}: {message}",
                registration.id
            );
        }
        failures
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic>"
    }
}
